// FAT16 entry mutator

use log::info;
use volprobe_core::{Volume, VolprobeError, VolprobeResult, VolumeOffset};

use crate::families::fat::common::{DIR_ENTRY_SIZE, ENTRY_END, ENTRY_FREE};

/// Mark the 32-byte slot at `at` free: every byte zeroed, then the tombstone in byte 0.
///
/// Slots are independent, so neighbouring entries are not touched. Long-name
/// fragments that belonged to the entry stay behind as orphans.
pub fn tombstone_entry(volume: &mut dyn Volume, at: VolumeOffset) -> VolprobeResult<()> {
    let current = volume.read_vec_at(at, DIR_ENTRY_SIZE)?;
    if current[0] == ENTRY_END || current[0] == ENTRY_FREE {
        return Err(VolprobeError::Corrupt(format!("slot at {} is not a live entry", at)));
    }

    let mut slot = [0u8; DIR_ENTRY_SIZE];
    slot[0] = ENTRY_FREE;
    volume.write_all_at(at, &slot)?;
    volume.flush_volume()?;
    info!("Marked directory slot at {} free", at);
    Ok(())
}
