// FAT16 tree navigator
// Scans the fixed root directory region, then follows each subdirectory's
// cluster chain. Short names match case-insensitively, long names exactly.

use log::{debug, trace, warn};
use std::collections::HashSet;
use volprobe_core::{LfnMode, Volume, VolprobeError, VolprobeResult, VolumeOffset};

use super::boot_sector::{next_cluster, Fat16Params};
use super::lfn_support::{preceding_slot_name, LfnParser};
use super::mutator::tombstone_entry;
use crate::families::fat::common::{FatDirEntry, DIR_ENTRY_SIZE};
use crate::search::{SearchContext, SearchHit, SearchMode};

/// Identifier for the root directory in the visited set; data clusters start at 2.
const ROOT_DIRECTORY_ID: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotScan {
    Continue,
    EndOfDirectory,
}

/// Per-directory scan state carried from one slot to the next.
struct DirectoryScan {
    lfn_mode: LfnMode,
    lfn: LfnParser,
    previous_slot: Option<Vec<u8>>,
    depth: usize,
}

pub struct Fat16Navigator<'v> {
    volume: &'v mut dyn Volume,
    params: Fat16Params,
    lfn_mode: LfnMode,
}

impl<'v> Fat16Navigator<'v> {
    pub fn new(volume: &'v mut dyn Volume, params: Fat16Params, lfn_mode: LfnMode) -> Self {
        Self { volume, params, lfn_mode }
    }

    /// Search the whole tree starting at the root directory region.
    pub fn search_root(&mut self, ctx: &mut SearchContext) -> VolprobeResult<()> {
        if !ctx.enter_directory(ROOT_DIRECTORY_ID, 0) {
            return Ok(());
        }

        let start = self.params.calculate_root_directory();
        let slots = self.params.root_entry_count as u64;
        debug!("Scanning root directory at {} ({} slots)", start, slots);

        let mut scan = self.new_scan(0);
        self.scan_region(ctx, &mut scan, start, slots)?;
        Ok(())
    }

    fn new_scan(&self, depth: usize) -> DirectoryScan {
        DirectoryScan {
            lfn_mode: self.lfn_mode,
            lfn: LfnParser::new(),
            previous_slot: None,
            depth,
        }
    }

    /// Search a subdirectory by following its cluster chain.
    fn search_subdirectory(&mut self, ctx: &mut SearchContext, first_cluster: u16, depth: usize) -> VolprobeResult<()> {
        if ctx.is_done() || !ctx.enter_directory(first_cluster as u64, depth) {
            return Ok(());
        }

        let slots_per_cluster = self.params.cluster_size() / DIR_ENTRY_SIZE as u64;
        let mut scan = self.new_scan(depth);
        let mut chain = HashSet::new();
        let mut cluster = first_cluster;
        debug!("Scanning directory at cluster {} (depth {})", first_cluster, depth);

        loop {
            if !chain.insert(cluster) {
                return Err(VolprobeError::Corrupt(format!("cluster chain from {} loops at {}", first_cluster, cluster)));
            }
            let start = self.params.calculate_cluster_offset(cluster)?;
            if self.scan_region(ctx, &mut scan, start, slots_per_cluster)? == SlotScan::EndOfDirectory {
                return Ok(());
            }
            match next_cluster(&mut *self.volume, &self.params, cluster)? {
                Some(next) => cluster = next,
                None => return Ok(()),
            }
        }
    }

    fn scan_region(
        &mut self,
        ctx: &mut SearchContext,
        scan: &mut DirectoryScan,
        start: VolumeOffset,
        slots: u64,
    ) -> VolprobeResult<SlotScan> {
        for index in 0..slots {
            if ctx.is_done() {
                return Ok(SlotScan::EndOfDirectory);
            }
            let at = start + index * DIR_ENTRY_SIZE as u64;
            if self.visit_slot(ctx, scan, at)? == SlotScan::EndOfDirectory {
                return Ok(SlotScan::EndOfDirectory);
            }
        }
        Ok(SlotScan::Continue)
    }

    fn visit_slot(&mut self, ctx: &mut SearchContext, scan: &mut DirectoryScan, at: VolumeOffset) -> VolprobeResult<SlotScan> {
        let raw = self.volume.read_vec_at(at, DIR_ENTRY_SIZE)?;
        let entry = FatDirEntry::parse(&raw);

        if entry.is_end() {
            trace!("End of directory at {}", at);
            return Ok(SlotScan::EndOfDirectory);
        }
        if entry.is_deleted() {
            scan.lfn.reset();
            scan.previous_slot = Some(raw);
            return Ok(SlotScan::Continue);
        }
        if scan.lfn.process_entry(&raw) {
            scan.previous_slot = Some(raw);
            return Ok(SlotScan::Continue);
        }

        let long_name = match scan.lfn_mode {
            LfnMode::Chain => scan.lfn.take_long_name(&entry.name),
            LfnMode::PrecedingSlot => scan.previous_slot.as_deref().map(preceding_slot_name),
        };
        scan.previous_slot = Some(raw);

        if entry.is_volume_label() {
            return Ok(SlotScan::Continue);
        }

        let short_name = entry.short_name();
        trace!("Slot {}: '{}' long {:?} attr {:#04x}", at, short_name, long_name, entry.attributes.0);

        if entry.is_plain_file() && names_match(ctx.target(), &short_name, long_name.as_deref()) {
            self.record_match(ctx, &entry, long_name.unwrap_or(short_name), at)?;
            return Ok(SlotScan::EndOfDirectory);
        }

        if entry.is_directory() && !entry.is_dot_entry() {
            self.descend(ctx, &entry, &short_name, scan.depth + 1)?;
        }
        Ok(SlotScan::Continue)
    }

    fn descend(&mut self, ctx: &mut SearchContext, entry: &FatDirEntry, name: &str, depth: usize) -> VolprobeResult<()> {
        let cluster = entry.first_cluster();
        if cluster == 0 {
            warn!("Directory '{}' has no first cluster, skipping", name);
            return Ok(());
        }
        match self.search_subdirectory(ctx, cluster, depth) {
            Err(e) if e.is_recoverable() => {
                warn!("Skipping directory '{}': {}", name, e);
                Ok(())
            }
            other => other,
        }
    }

    fn record_match(&mut self, ctx: &mut SearchContext, entry: &FatDirEntry, name: String, at: VolumeOffset) -> VolprobeResult<()> {
        let deleted = match ctx.mode() {
            SearchMode::Find => false,
            SearchMode::Delete => {
                tombstone_entry(&mut *self.volume, at)?;
                true
            }
        };
        debug!("Matched '{}' at {} ({} bytes)", name, at, entry.file_size);
        ctx.record_hit(SearchHit {
            name,
            size: entry.file_size,
            location: at,
            deleted,
        });
        Ok(())
    }
}

/// Short names compare against the ASCII-uppercased target, long names literally.
fn names_match(target: &str, short_name: &str, long_name: Option<&str>) -> bool {
    short_name == target.to_ascii_uppercase() || long_name == Some(target)
}
