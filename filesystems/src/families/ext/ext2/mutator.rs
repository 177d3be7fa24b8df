// EXT2 entry mutator
// Splices a directory entry out of its rec_len chain in place.

use log::{debug, info};
use volprobe_core::{BlockOffset, Volume, VolprobeError, VolprobeResult, VolumeOffset};

use super::constants::*;
use super::structures::DirEntry;
use crate::endian::{u16_bytes, LeFields};

/// Where a live directory entry sits, plus the entry before it in the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntrySlot {
    pub block_start: VolumeOffset,
    pub cursor: BlockOffset,
    pub rec_len: u16,
    pub name_len: u8,
    /// In-block position and record length of the preceding entry, if any.
    pub previous: Option<(BlockOffset, u16)>,
}

impl EntrySlot {
    pub fn location(&self) -> VolumeOffset {
        self.block_start.at(self.cursor)
    }
}

/// Unlink the entry described by `slot`.
///
/// With a predecessor, the predecessor's `rec_len` grows to cover the entry,
/// so the sum of record lengths in the block is unchanged. The first entry of
/// a block has no predecessor and keeps its `rec_len`. Either way the
/// entry's inode number, name length, type and name bytes are zeroed.
/// Inode and bitmap accounting is left untouched.
pub fn unlink_entry(volume: &mut dyn Volume, slot: &EntrySlot) -> VolprobeResult<()> {
    // Confirm the header still describes the scanned record before writing anything
    let at = slot.location();
    let header = volume.read_vec_at(at, DIR_ENTRY_HEADER_LEN as usize)?;
    if header.le_u16(DE_REC_LEN) != slot.rec_len {
        return Err(VolprobeError::Corrupt(format!("entry at {} no longer matches the scanned record", at)));
    }

    if let Some((prev_cursor, prev_len)) = slot.previous {
        absorb_into_previous(volume, slot, prev_cursor, prev_len)?;
    } else {
        debug!("Entry at {} is first in its block, clearing in place", slot.location());
    }

    clear_entry(volume, slot)?;
    volume.flush_volume()?;
    info!("Unlinked directory entry at {}", at);
    Ok(())
}

fn absorb_into_previous(
    volume: &mut dyn Volume,
    slot: &EntrySlot,
    prev_cursor: BlockOffset,
    prev_len: u16,
) -> VolprobeResult<()> {
    // The predecessor starts prev_len bytes before this entry
    let expected = slot.cursor.checked_sub(prev_len as u32);
    if expected != Some(prev_cursor) {
        return Err(VolprobeError::Corrupt(format!(
            "previous entry at {} with length {} does not end at {}",
            prev_cursor, prev_len, slot.cursor
        )));
    }

    let prev_at = slot.block_start.at(prev_cursor);
    let header = volume.read_vec_at(prev_at, DIR_ENTRY_HEADER_LEN as usize)?;
    let (_, on_disk_len, _, _) = DirEntry::parse_header(&header);
    if on_disk_len != prev_len {
        return Err(VolprobeError::Corrupt(format!(
            "entry at {} changed length from {} to {}",
            prev_at, prev_len, on_disk_len
        )));
    }

    let merged = prev_len.checked_add(slot.rec_len).ok_or_else(|| {
        VolprobeError::Corrupt(format!("merged record length {} + {} overflows", prev_len, slot.rec_len))
    })?;
    debug!("Extending entry at {} from {} to {} bytes", prev_at, prev_len, merged);
    volume.write_all_at(prev_at + DE_REC_LEN as u64, &u16_bytes(merged))
}

fn clear_entry(volume: &mut dyn Volume, slot: &EntrySlot) -> VolprobeResult<()> {
    let at = slot.location();
    volume.write_all_at(at + DE_INODE as u64, &[0u8; 4])?;
    volume.write_all_at(at + DE_NAME_LEN as u64, &[0u8; 2])?;
    volume.write_all_at(at + DE_NAME as u64, &vec![0u8; slot.name_len as usize])
}
