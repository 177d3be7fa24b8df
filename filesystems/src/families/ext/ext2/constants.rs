// EXT2 on-disk constants
// Offsets are relative to the start of the record they belong to

// Superblock location
pub const SUPERBLOCK_OFFSET: u64 = 1024;
pub const SUPERBLOCK_SIZE: usize = 1024;
pub const EXT2_SUPER_MAGIC: u16 = 0xEF53;

// Superblock field offsets
pub const S_INODES_COUNT: usize = 0;
pub const S_BLOCKS_COUNT: usize = 4;
pub const S_R_BLOCKS_COUNT: usize = 8;
pub const S_FREE_BLOCKS_COUNT: usize = 12;
pub const S_FREE_INODES_COUNT: usize = 16;
pub const S_FIRST_DATA_BLOCK: usize = 20;
pub const S_LOG_BLOCK_SIZE: usize = 24;
pub const S_BLOCKS_PER_GROUP: usize = 32;
pub const S_FRAGS_PER_GROUP: usize = 36;
pub const S_INODES_PER_GROUP: usize = 40;
pub const S_MTIME: usize = 44;
pub const S_WTIME: usize = 48;
pub const S_MAGIC: usize = 56;
pub const S_LASTCHECK: usize = 64;
pub const S_REV_LEVEL: usize = 76;
pub const S_FIRST_INO: usize = 84;
pub const S_INODE_SIZE: usize = 88;
pub const S_VOLUME_NAME: usize = 120;
pub const VOLUME_NAME_LEN: usize = 16;

// Block sizes
pub const MIN_BLOCK_SIZE: u32 = 1024;
pub const MAX_LOG_BLOCK_SIZE: u32 = 6; // 64 KiB

// Revision 0 superblocks carry no inode size field
pub const GOOD_OLD_REV: u32 = 0;
pub const GOOD_OLD_INODE_SIZE: u16 = 128;
pub const GOOD_OLD_FIRST_INO: u32 = 11;

// Block group descriptor
pub const GROUP_DESC_SIZE: usize = 32;
pub const BG_BLOCK_BITMAP: usize = 0;
pub const BG_INODE_BITMAP: usize = 4;
pub const BG_INODE_TABLE: usize = 8;
pub const BG_FREE_BLOCKS_COUNT: usize = 12;
pub const BG_FREE_INODES_COUNT: usize = 14;
pub const BG_USED_DIRS_COUNT: usize = 16;

// Inode record, first 128 bytes only
pub const INODE_RECORD_LEN: usize = 128;
pub const I_MODE: usize = 0;
pub const I_UID: usize = 2;
pub const I_SIZE: usize = 4;
pub const I_ATIME: usize = 8;
pub const I_CTIME: usize = 12;
pub const I_MTIME: usize = 16;
pub const I_DTIME: usize = 20;
pub const I_GID: usize = 24;
pub const I_LINKS_COUNT: usize = 26;
pub const I_BLOCKS: usize = 28;
pub const I_FLAGS: usize = 32;
pub const I_BLOCK: usize = 40;
pub const I_GENERATION: usize = 100;
pub const I_FILE_ACL: usize = 104;
pub const I_DIR_ACL: usize = 108;
pub const N_BLOCKS: usize = 15;
pub const N_DIRECT_BLOCKS: usize = 12;

// Directory entry
pub const DIR_ENTRY_HEADER_LEN: u16 = 8;
pub const DE_INODE: usize = 0;
pub const DE_REC_LEN: usize = 4;
pub const DE_NAME_LEN: usize = 6;
pub const DE_FILE_TYPE: usize = 7;
pub const DE_NAME: usize = 8;

// Special inode numbers
pub const ROOT_INO: u32 = 2;
