// EXT2 on-disk structures, decoded field by field from raw little-endian records

use super::constants::*;
use crate::endian::LeFields;

/// Inode region parameters from the superblock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InodeParams {
    /// Size of one inode record on disk (128 on revision 0 volumes).
    pub inode_size: u16,
    pub inodes_count: u32,
    pub first_ino: u32,
    pub inodes_per_group: u32,
    pub free_inodes_count: u32,
}

/// Block region parameters from the superblock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockParams {
    pub log_block_size: u32,
    pub reserved_blocks_count: u32,
    pub free_blocks_count: u32,
    pub blocks_count: u32,
    pub first_data_block: u32,
    pub blocks_per_group: u32,
    pub frags_per_group: u32,
}

impl BlockParams {
    /// `1024 << log_block_size`, or 0 when the exponent is out of range.
    pub fn block_size(&self) -> u32 {
        if self.log_block_size > MAX_LOG_BLOCK_SIZE {
            return 0;
        }
        MIN_BLOCK_SIZE << self.log_block_size
    }
}

/// Volume identity and timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VolumeIdentity {
    /// Raw name bytes; not guaranteed to be NUL terminated.
    pub volume_name: [u8; VOLUME_NAME_LEN],
    pub last_check: u32,
    pub last_mount: u32,
    pub last_write: u32,
}

impl VolumeIdentity {
    /// Name up to the first NUL, bytes read as ISO-8859-1.
    pub fn name(&self) -> String {
        self.volume_name
            .iter()
            .take_while(|&&b| b != 0)
            .map(|&b| b as char)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ext2Superblock {
    pub magic: u16,
    pub rev_level: u32,
    pub inode: InodeParams,
    pub block: BlockParams,
    pub volume: VolumeIdentity,
}

impl Ext2Superblock {
    /// Decode from the bytes at offset 1024. Fields missing from a short buffer decode as 0.
    pub fn parse(buf: &[u8]) -> Self {
        let rev_level = buf.le_u32(S_REV_LEVEL);
        let raw_inode_size = buf.le_u16(S_INODE_SIZE);
        let inode_size = if rev_level == GOOD_OLD_REV || raw_inode_size == 0 {
            GOOD_OLD_INODE_SIZE
        } else {
            raw_inode_size
        };
        let first_ino = if rev_level == GOOD_OLD_REV {
            GOOD_OLD_FIRST_INO
        } else {
            buf.le_u32(S_FIRST_INO)
        };

        Self {
            magic: buf.le_u16(S_MAGIC),
            rev_level,
            inode: InodeParams {
                inode_size,
                inodes_count: buf.le_u32(S_INODES_COUNT),
                first_ino,
                inodes_per_group: buf.le_u32(S_INODES_PER_GROUP),
                free_inodes_count: buf.le_u32(S_FREE_INODES_COUNT),
            },
            block: BlockParams {
                log_block_size: buf.le_u32(S_LOG_BLOCK_SIZE),
                reserved_blocks_count: buf.le_u32(S_R_BLOCKS_COUNT),
                free_blocks_count: buf.le_u32(S_FREE_BLOCKS_COUNT),
                blocks_count: buf.le_u32(S_BLOCKS_COUNT),
                first_data_block: buf.le_u32(S_FIRST_DATA_BLOCK),
                blocks_per_group: buf.le_u32(S_BLOCKS_PER_GROUP),
                frags_per_group: buf.le_u32(S_FRAGS_PER_GROUP),
            },
            volume: VolumeIdentity {
                volume_name: buf.bytes_at::<VOLUME_NAME_LEN>(S_VOLUME_NAME),
                last_check: buf.le_u32(S_LASTCHECK),
                last_mount: buf.le_u32(S_MTIME),
                last_write: buf.le_u32(S_WTIME),
            },
        }
    }

    pub fn is_valid_magic(&self) -> bool {
        self.magic == EXT2_SUPER_MAGIC
    }

    pub fn block_size(&self) -> u32 {
        self.block.block_size()
    }
}

/// One block group descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupDescriptor {
    pub block_bitmap: u32,
    pub inode_bitmap: u32,
    pub inode_table: u32,
    pub free_blocks_count: u16,
    pub free_inodes_count: u16,
    pub used_dirs_count: u16,
}

impl GroupDescriptor {
    pub fn parse(buf: &[u8]) -> Self {
        Self {
            block_bitmap: buf.le_u32(BG_BLOCK_BITMAP),
            inode_bitmap: buf.le_u32(BG_INODE_BITMAP),
            inode_table: buf.le_u32(BG_INODE_TABLE),
            free_blocks_count: buf.le_u16(BG_FREE_BLOCKS_COUNT),
            free_inodes_count: buf.le_u16(BG_FREE_INODES_COUNT),
            used_dirs_count: buf.le_u16(BG_USED_DIRS_COUNT),
        }
    }
}

/// Inode table entry (the revision-0 128-byte prefix).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ext2Inode {
    pub mode: u16,
    pub uid: u16,
    pub size: u32,
    pub atime: u32,
    pub ctime: u32,
    pub mtime: u32,
    pub dtime: u32,
    pub gid: u16,
    pub links_count: u16,
    /// Count of 512-byte sectors reserved for the data.
    pub blocks: u32,
    pub flags: u32,
    pub block: [u32; N_BLOCKS],
    pub generation: u32,
    pub file_acl: u32,
    pub dir_acl: u32,
}

impl Ext2Inode {
    pub fn parse(buf: &[u8]) -> Self {
        let mut block = [0u32; N_BLOCKS];
        for (i, ptr) in block.iter_mut().enumerate() {
            *ptr = buf.le_u32(I_BLOCK + i * 4);
        }

        Self {
            mode: buf.le_u16(I_MODE),
            uid: buf.le_u16(I_UID),
            size: buf.le_u32(I_SIZE),
            atime: buf.le_u32(I_ATIME),
            ctime: buf.le_u32(I_CTIME),
            mtime: buf.le_u32(I_MTIME),
            dtime: buf.le_u32(I_DTIME),
            gid: buf.le_u16(I_GID),
            links_count: buf.le_u16(I_LINKS_COUNT),
            blocks: buf.le_u32(I_BLOCKS),
            flags: buf.le_u32(I_FLAGS),
            block,
            generation: buf.le_u32(I_GENERATION),
            file_acl: buf.le_u32(I_FILE_ACL),
            dir_acl: buf.le_u32(I_DIR_ACL),
        }
    }

    pub fn direct_blocks(&self) -> &[u32] {
        &self.block[..N_DIRECT_BLOCKS]
    }

    pub fn is_directory(&self) -> bool {
        self.mode & 0xF000 == 0x4000
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Unknown = 0,
    Regular = 1,
    Directory = 2,
    CharDevice = 3,
    BlockDevice = 4,
    Fifo = 5,
    Socket = 6,
    Symlink = 7,
}

impl From<u8> for FileType {
    fn from(val: u8) -> Self {
        match val {
            1 => FileType::Regular,
            2 => FileType::Directory,
            3 => FileType::CharDevice,
            4 => FileType::BlockDevice,
            5 => FileType::Fifo,
            6 => FileType::Socket,
            7 => FileType::Symlink,
            _ => FileType::Unknown,
        }
    }
}

/// A linked directory entry. The name is kept as raw bytes; it is
/// length-prefixed on disk, not NUL terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub inode: u32,
    pub rec_len: u16,
    pub name_len: u8,
    pub file_type: FileType,
    pub name: Vec<u8>,
}

impl DirEntry {
    pub fn parse_header(buf: &[u8]) -> (u32, u16, u8, FileType) {
        (
            buf.le_u32(DE_INODE),
            buf.le_u16(DE_REC_LEN),
            buf.le_u8(DE_NAME_LEN),
            FileType::from(buf.le_u8(DE_FILE_TYPE)),
        )
    }

    pub fn name_lossy(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    pub fn is_dot_or_dotdot(&self) -> bool {
        self.name == b"." || self.name == b".."
    }

    /// A subdirectory the navigator should descend into.
    pub fn is_traversable_directory(&self) -> bool {
        self.file_type == FileType::Directory && !self.is_dot_or_dotdot()
    }
}
