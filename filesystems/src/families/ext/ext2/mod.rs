// EXT2 support: superblock and inode decoding, directory traversal and entry unlinking

pub mod constants;
pub mod mutator;
pub mod navigator;
pub mod ops;
pub mod reader;
pub mod structures;


pub use self::ops::Ext2Ops;
pub use self::reader::Ext2Reader;
pub use self::structures::{Ext2Inode, Ext2Superblock, GroupDescriptor};

use crate::detection::FilesystemDetector;
use crate::endian::LeFields;
use volprobe_core::FilesystemKind;

pub struct Ext2Detector;

impl FilesystemDetector for Ext2Detector {
    fn detect(_boot_sector: &[u8], ext_superblock: Option<&[u8]>) -> Option<FilesystemKind> {
        // Magic lives 56 bytes into the superblock at offset 1024
        let sb = ext_superblock?;
        if sb.len() >= constants::S_MAGIC + 2 && sb.le_u16(constants::S_MAGIC) == constants::EXT2_SUPER_MAGIC {
            Some(FilesystemKind::Ext2)
        } else {
            None
        }
    }
}
