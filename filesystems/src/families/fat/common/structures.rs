// FAT directory entry, decoded field by field

use super::constants::*;
use crate::endian::LeFields;

/// FAT Directory Entry Attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatAttributes(pub u8);

impl FatAttributes {
    pub const READ_ONLY: u8 = 0x01;
    pub const HIDDEN: u8 = 0x02;
    pub const SYSTEM: u8 = 0x04;
    pub const VOLUME_ID: u8 = 0x08;
    pub const DIRECTORY: u8 = 0x10;
    pub const ARCHIVE: u8 = 0x20;
    pub const LFN: u8 = Self::READ_ONLY | Self::HIDDEN | Self::SYSTEM | Self::VOLUME_ID;

    pub fn is_volume_id(&self) -> bool { self.0 & Self::VOLUME_ID != 0 }
    pub fn is_directory(&self) -> bool { self.0 & Self::DIRECTORY != 0 }
    pub fn is_lfn(&self) -> bool { self.0 & 0x3F == Self::LFN }
}

/// FAT Directory Entry (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatDirEntry {
    /// Short filename, 8.3 space padded with no separator stored
    pub name: [u8; DIR_NAME_LEN],
    pub attributes: FatAttributes,
    pub first_cluster_high: u16,
    pub write_time: u16,
    pub write_date: u16,
    pub first_cluster_low: u16,
    pub file_size: u32,
}

impl FatDirEntry {
    pub fn parse(buf: &[u8]) -> Self {
        Self {
            name: buf.bytes_at::<DIR_NAME_LEN>(0),
            attributes: FatAttributes(buf.le_u8(DIR_ATTR)),
            first_cluster_high: buf.le_u16(DIR_FST_CLUS_HI),
            write_time: buf.le_u16(DIR_WRT_TIME),
            write_date: buf.le_u16(DIR_WRT_DATE),
            first_cluster_low: buf.le_u16(DIR_FST_CLUS_LO),
            file_size: buf.le_u32(DIR_FILE_SIZE),
        }
    }

    /// FAT16 only uses the low word.
    pub fn first_cluster(&self) -> u16 {
        self.first_cluster_low
    }

    /// Check if this is the end of directory
    pub fn is_end(&self) -> bool {
        self.name[0] == ENTRY_END
    }

    /// Check if this entry is deleted
    pub fn is_deleted(&self) -> bool {
        self.name[0] == ENTRY_FREE
    }

    pub fn is_lfn(&self) -> bool {
        self.attributes.is_lfn()
    }

    pub fn is_directory(&self) -> bool {
        !self.is_lfn() && self.attributes.is_directory()
    }

    pub fn is_volume_label(&self) -> bool {
        !self.is_lfn() && self.attributes.is_volume_id() && !self.attributes.is_directory()
    }

    /// A regular file: neither a directory, a volume label nor a long-name fragment.
    pub fn is_plain_file(&self) -> bool {
        !self.is_lfn() && self.attributes.0 & (FatAttributes::DIRECTORY | FatAttributes::VOLUME_ID) == 0
    }

    pub fn is_dot_entry(&self) -> bool {
        &self.name == b".          " || &self.name == b"..         "
    }

    /// Displayable 8.3 name: base and extension trimmed, joined by '.' when
    /// there is an extension. Bytes are read as ISO-8859-1.
    pub fn short_name(&self) -> String {
        let decode = |bytes: &[u8]| -> String {
            bytes
                .iter()
                .take_while(|&&b| b != 0x00)
                .filter(|&&b| b != b' ')
                .map(|&b| b as char)
                .collect()
        };

        let mut base_bytes = [0u8; 8];
        base_bytes.copy_from_slice(&self.name[..8]);
        if base_bytes[0] == ENTRY_KANJI_E5 {
            base_bytes[0] = ENTRY_FREE;
        }

        let base = decode(&base_bytes);
        let ext = decode(&self.name[8..]);
        if ext.is_empty() {
            base
        } else {
            format!("{}.{}", base, ext)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &[u8; 11], attr: u8) -> FatDirEntry {
        let mut buf = [0u8; 32];
        buf[..11].copy_from_slice(name);
        buf[11] = attr;
        buf[26..28].copy_from_slice(&7u16.to_le_bytes());
        buf[28..32].copy_from_slice(&1234u32.to_le_bytes());
        FatDirEntry::parse(&buf)
    }

    #[test]
    fn test_short_name_forms() {
        assert_eq!(entry(b"README  TXT", 0x20).short_name(), "README.TXT");
        assert_eq!(entry(b"LONGNAMETXT", 0x20).short_name(), "LONGNAME.TXT");
        assert_eq!(entry(b"DOCS       ", 0x10).short_name(), "DOCS");
        assert_eq!(entry(b"A B     C  ", 0x20).short_name(), "AB.C");
        assert_eq!(entry(b"\x05ABC    TXT", 0x20).short_name(), "\u{e5}ABC.TXT");
        assert_eq!(entry(b"..         ", 0x10).short_name(), "..");
    }

    #[test]
    fn test_entry_classification() {
        let file = entry(b"README  TXT", FatAttributes::ARCHIVE);
        assert!(file.is_plain_file());
        assert!(!file.is_directory());
        assert_eq!(file.first_cluster(), 7);
        assert_eq!(file.file_size, 1234);

        let dir = entry(b"DOCS       ", FatAttributes::DIRECTORY);
        assert!(dir.is_directory());
        assert!(!dir.is_plain_file());

        let label = entry(b"VOLPROBE   ", FatAttributes::VOLUME_ID);
        assert!(label.is_volume_label());
        assert!(!label.is_plain_file());

        let lfn = entry(b"Ar\0e\0a\0d\0m\0", FatAttributes::LFN);
        assert!(lfn.is_lfn());
        assert!(!lfn.is_plain_file());
        assert!(!lfn.is_directory());

        assert!(entry(b".          ", 0x10).is_dot_entry());
        assert!(entry(b"..         ", 0x10).is_dot_entry());
        assert!(!entry(b"...        ", 0x10).is_dot_entry());
    }
}
