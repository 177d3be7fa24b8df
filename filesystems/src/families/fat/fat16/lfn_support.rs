// FAT16 Long Filename Support Module
// Recovers VFAT long names from the slots that precede a short entry

use log::trace;

use crate::endian::LeFields;
use crate::families::fat::common::{FatAttributes, DIR_ATTR, DIR_ENTRY_SIZE, DIR_NAME_LEN};

const LAST_LONG_ENTRY: u8 = 0x40;
const LFN_ORDER_MASK: u8 = 0x3F;
const LFN_CHECKSUM: usize = 13;
const CHARS_PER_ENTRY: usize = 13;

/// Byte offsets of the 13 UTF-16 code units within one long-name slot.
const LFN_CHAR_OFFSETS: [usize; CHARS_PER_ENTRY] = [1, 3, 5, 7, 9, 14, 16, 18, 20, 22, 24, 28, 30];

/// LFN entry, decoded from one 32-byte slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LongNameEntry {
    pub order: u8,
    pub checksum: u8,
    pub chars: [u16; CHARS_PER_ENTRY],
}

impl LongNameEntry {
    pub fn parse(slot: &[u8]) -> Option<Self> {
        if slot.len() < DIR_ENTRY_SIZE || !FatAttributes(slot[DIR_ATTR]).is_lfn() {
            return None;
        }
        let mut chars = [0u16; CHARS_PER_ENTRY];
        for (ch, &offset) in chars.iter_mut().zip(LFN_CHAR_OFFSETS.iter()) {
            *ch = slot.le_u16(offset);
        }
        Some(Self {
            order: slot[0],
            checksum: slot[LFN_CHECKSUM],
            chars,
        })
    }

    pub fn sequence(&self) -> u8 {
        self.order & LFN_ORDER_MASK
    }

    pub fn is_last(&self) -> bool {
        self.order & LAST_LONG_ENTRY != 0
    }
}

/// Parse long filename entries from a directory
///
/// Fragments are fed in on-disk order; the run is only accepted when it
/// starts with the flagged last fragment, counts down to 1, and every
/// fragment carries the checksum of the short name that follows.
#[derive(Debug, Default)]
pub struct LfnParser {
    lfn_entries: Vec<LongNameEntry>,
}

impl LfnParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a directory slot - returns true if it's an LFN entry
    pub fn process_entry(&mut self, slot: &[u8]) -> bool {
        match LongNameEntry::parse(slot) {
            Some(lfn) => {
                if lfn.is_last() {
                    self.lfn_entries.clear();
                }
                self.lfn_entries.push(lfn);
                true
            }
            None => false,
        }
    }

    /// Long name for the short entry `short_name`, if the collected run belongs to it. Resets the parser.
    pub fn take_long_name(&mut self, short_name: &[u8; DIR_NAME_LEN]) -> Option<String> {
        let entries = std::mem::take(&mut self.lfn_entries);
        let first = entries.first()?;
        if !first.is_last() || first.sequence() as usize != entries.len() {
            trace!("Discarding long-name run of {} fragments: bad ordering", entries.len());
            return None;
        }

        let checksum = calculate_checksum(short_name);
        for (i, lfn) in entries.iter().enumerate() {
            if lfn.sequence() as usize != entries.len() - i || lfn.checksum != checksum {
                trace!("Discarding long-name run: fragment {} does not match", i);
                return None;
            }
        }

        Some(Self::parse_long_name(&entries))
    }

    /// LFN entries are stored in reverse order
    fn parse_long_name(lfn_entries: &[LongNameEntry]) -> String {
        let units: Vec<u16> = lfn_entries
            .iter()
            .rev()
            .flat_map(|lfn| lfn.chars.iter().copied())
            .take_while(|&ch| ch != 0x0000 && ch != 0xFFFF)
            .collect();
        String::from_utf16_lossy(&units)
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.lfn_entries.clear();
    }
}

/// Calculate checksum for short name
pub fn calculate_checksum(short_name: &[u8; DIR_NAME_LEN]) -> u8 {
    let mut sum: u8 = 0;
    for &byte in short_name {
        sum = ((sum >> 1) | (sum << 7)).wrapping_add(byte);
    }
    sum
}

/// Single-slot reconstruction: the low byte of each of the 13 character
/// positions of `previous`, up to the first NUL, read as ISO-8859-1. The slot
/// is not checked to be a long-name fragment.
pub fn preceding_slot_name(previous: &[u8]) -> String {
    LFN_CHAR_OFFSETS
        .iter()
        .map(|&offset| previous.le_u8(offset))
        .take_while(|&b| b != 0)
        .map(|b| b as char)
        .collect()
}
