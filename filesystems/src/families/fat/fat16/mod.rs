// FAT16 support: boot sector geometry, directory traversal and slot tombstoning

pub mod boot_sector;
pub mod lfn_support;
pub mod mutator;
pub mod navigator;
pub mod ops;


pub use self::boot_sector::Fat16Params;
pub use self::navigator::Fat16Navigator;
pub use self::ops::Fat16Ops;

use crate::detection::FilesystemDetector;
use crate::families::fat::common::{BS16_FIL_SYS_TYPE, FAT16_TYPE_STRING};
use volprobe_core::FilesystemKind;

pub struct Fat16Detector;

impl FilesystemDetector for Fat16Detector {
    fn detect(boot_sector: &[u8], _ext_superblock: Option<&[u8]>) -> Option<FilesystemKind> {
        let fs_type = boot_sector.get(BS16_FIL_SYS_TYPE..BS16_FIL_SYS_TYPE + FAT16_TYPE_STRING.len())?;
        if fs_type == FAT16_TYPE_STRING {
            Some(FilesystemKind::Fat16)
        } else {
            None
        }
    }
}
