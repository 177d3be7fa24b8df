// FAT on-disk constants used by the FAT16 reader

// Boot sector offsets
pub const BS_OEM_NAME: usize = 0x03;
pub const BPB_BYTES_PER_SEC: usize = 0x0B;
pub const BPB_SEC_PER_CLUS: usize = 0x0D;
pub const BPB_RSVD_SEC_CNT: usize = 0x0E;
pub const BPB_NUM_FATS: usize = 0x10;
pub const BPB_ROOT_ENT_CNT: usize = 0x11;
pub const BPB_TOT_SEC16: usize = 0x13;
pub const BPB_MEDIA: usize = 0x15;
pub const BPB_FAT_SZ16: usize = 0x16;
pub const BPB_TOT_SEC32: usize = 0x20;

// FAT16 extended boot record
pub const BS16_VOL_ID: usize = 0x27;
pub const BS16_VOL_LAB: usize = 0x2B;
pub const BS16_FIL_SYS_TYPE: usize = 0x36;
pub const FAT16_TYPE_STRING: &[u8; 8] = b"FAT16   ";

pub const BOOT_SECTOR_LEN: usize = 512;

// Directory entries
pub const DIR_ENTRY_SIZE: usize = 32;
pub const DIR_NAME_LEN: usize = 11;
pub const DIR_ATTR: usize = 0x0B;
pub const DIR_FST_CLUS_HI: usize = 0x14;
pub const DIR_WRT_TIME: usize = 0x16;
pub const DIR_WRT_DATE: usize = 0x18;
pub const DIR_FST_CLUS_LO: usize = 0x1A;
pub const DIR_FILE_SIZE: usize = 0x1C;

// First name byte markers
pub const ENTRY_END: u8 = 0x00;
pub const ENTRY_FREE: u8 = 0xE5;
pub const ENTRY_KANJI_E5: u8 = 0x05;

// FAT16 entry values
pub const FAT16_EOC: u16 = 0xFFF8; // End of chain marker
pub const FAT16_BAD: u16 = 0xFFF7; // Bad cluster marker
pub const FIRST_DATA_CLUSTER: u16 = 2;
