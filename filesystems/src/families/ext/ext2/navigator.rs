// EXT2 tree navigator
// Depth-first walk over the linked directory entries held in each directory's
// direct blocks. Matching entries are reported or unlinked through the mutator.

use log::{debug, trace, warn};
use volprobe_core::{BlockOffset, VolprobeError, VolprobeResult};

use super::constants::*;
use super::mutator::{unlink_entry, EntrySlot};
use super::reader::Ext2Reader;
use super::structures::{DirEntry, FileType};
use crate::search::{SearchContext, SearchHit, SearchMode};

/// How a block scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockScan {
    /// Reached the end of the block; keep going with the next one.
    Exhausted,
    /// The directory ends inside this block.
    EndOfDirectory,
}

/// Search the tree rooted at `dir_inode`.
pub fn search_directory(
    reader: &mut Ext2Reader<'_>,
    ctx: &mut SearchContext,
    dir_inode: u32,
    depth: usize,
) -> VolprobeResult<()> {
    if ctx.is_done() || !ctx.enter_directory(dir_inode as u64, depth) {
        return Ok(());
    }

    let inode = reader.read_inode(dir_inode)?;
    let block_size = reader.block_size() as u64;
    let dir_size = inode.size as u64;
    debug!("Scanning directory inode {} ({} bytes, depth {})", dir_inode, dir_size, depth);

    for (index, &block) in inode.direct_blocks().iter().enumerate() {
        let base = index as u64 * block_size;
        if ctx.is_done() || base >= dir_size {
            break;
        }
        if block == 0 {
            trace!("Directory inode {} has a hole at block index {}", dir_inode, index);
            continue;
        }

        match scan_block(reader, ctx, block, base, dir_size, depth) {
            Ok(BlockScan::Exhausted) => {}
            Ok(BlockScan::EndOfDirectory) => break,
            Err(e) if e.is_recoverable() => {
                warn!("Directory inode {} block {}: {}; skipping rest of block", dir_inode, block, e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// Walk the `rec_len` chain of one directory block.
fn scan_block(
    reader: &mut Ext2Reader<'_>,
    ctx: &mut SearchContext,
    block: u32,
    base: u64,
    dir_size: u64,
    depth: usize,
) -> VolprobeResult<BlockScan> {
    let block_size = reader.block_size();
    let block_start = reader.block_offset(block)?;
    let mut cursor = BlockOffset::ZERO;
    let mut previous: Option<(BlockOffset, u16)> = None;

    while cursor.get() < block_size {
        if base + cursor.get() as u64 >= dir_size {
            return Ok(BlockScan::EndOfDirectory);
        }

        let entry = reader.read_dir_entry(block_start.at(cursor))?;
        check_entry_bounds(&entry, cursor, block_size)?;
        let next = cursor
            .advance(entry.rec_len as u32)
            .ok_or_else(|| VolprobeError::Corrupt("directory offset overflow".to_string()))?;

        if entry.inode == 0 {
            trace!("Unused entry at {}{}", block_start, cursor);
        } else {
            trace!(
                "Entry '{}' inode {} type {:?} rec_len {}",
                entry.name_lossy(),
                entry.inode,
                entry.file_type,
                entry.rec_len
            );

            let slot = EntrySlot {
                block_start,
                cursor,
                rec_len: entry.rec_len,
                name_len: entry.name_len,
                previous,
            };
            visit_entry(reader, ctx, &entry, slot, depth)?;
            if ctx.is_done() {
                return Ok(BlockScan::EndOfDirectory);
            }
            if entry.file_type == FileType::Unknown {
                debug!("Entry '{}' has unknown type, ending directory scan", entry.name_lossy());
                return Ok(BlockScan::EndOfDirectory);
            }
        }

        previous = Some((cursor, entry.rec_len));
        cursor = next;
        if base + cursor.get() as u64 >= dir_size {
            return Ok(BlockScan::EndOfDirectory);
        }
    }

    Ok(BlockScan::Exhausted)
}

fn check_entry_bounds(entry: &DirEntry, cursor: BlockOffset, block_size: u32) -> VolprobeResult<()> {
    if entry.rec_len < DIR_ENTRY_HEADER_LEN {
        return Err(VolprobeError::Corrupt(format!(
            "record length {} at {} is shorter than an entry header",
            entry.rec_len, cursor
        )));
    }
    if cursor.get() + entry.rec_len as u32 > block_size {
        return Err(VolprobeError::Corrupt(format!(
            "record length {} at {} runs past the block end",
            entry.rec_len, cursor
        )));
    }
    if DIR_ENTRY_HEADER_LEN + entry.name_len as u16 > entry.rec_len {
        return Err(VolprobeError::Corrupt(format!(
            "name length {} at {} exceeds record length {}",
            entry.name_len, cursor, entry.rec_len
        )));
    }
    Ok(())
}

fn visit_entry(
    reader: &mut Ext2Reader<'_>,
    ctx: &mut SearchContext,
    entry: &DirEntry,
    slot: EntrySlot,
    depth: usize,
) -> VolprobeResult<()> {
    if entry.is_traversable_directory() {
        return match search_directory(reader, ctx, entry.inode, depth + 1) {
            Err(e) if e.is_recoverable() => {
                warn!("Skipping directory '{}': {}", entry.name_lossy(), e);
                Ok(())
            }
            other => other,
        };
    }

    if entry.name != ctx.target().as_bytes() {
        return Ok(());
    }

    let size = reader.read_inode(entry.inode)?.size;
    let location = slot.location();
    let deleted = match ctx.mode() {
        SearchMode::Find => false,
        SearchMode::Delete => {
            unlink_entry(reader.volume(), &slot)?;
            true
        }
    };

    debug!("Matched '{}' at {} ({} bytes)", entry.name_lossy(), location, size);
    ctx.record_hit(SearchHit {
        name: entry.name_lossy(),
        size,
        location,
        deleted,
    });
    Ok(())
}
