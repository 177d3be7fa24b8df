// EXT2 FilesystemOps implementation

use chrono::{DateTime, Utc};
use volprobe_core::{FilesystemKind, MetadataReport, ReportSection, ScanOptions, Volume, VolprobeResult};

use super::constants::ROOT_INO;
use super::navigator::search_directory;
use super::reader::{read_superblock_best_effort, Ext2Reader};
use super::structures::Ext2Superblock;
use crate::ops::FilesystemOps;
use crate::search::SearchContext;

pub struct Ext2Ops {
    options: ScanOptions,
}

impl Ext2Ops {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }
}

impl FilesystemOps for Ext2Ops {
    fn filesystem_kind(&self) -> FilesystemKind {
        FilesystemKind::Ext2
    }

    fn options(&self) -> &ScanOptions {
        &self.options
    }

    fn info(&mut self, volume: &mut dyn Volume) -> VolprobeResult<MetadataReport> {
        let sb = read_superblock_best_effort(volume)?;
        Ok(superblock_report(&sb))
    }

    fn search(&mut self, volume: &mut dyn Volume, ctx: &mut SearchContext) -> VolprobeResult<()> {
        let mut reader = Ext2Reader::new(volume)?;
        search_directory(&mut reader, ctx, ROOT_INO, 0)
    }
}

/// Render a Unix timestamp as UTC calendar time.
pub fn format_timestamp(secs: u32) -> String {
    match DateTime::<Utc>::from_timestamp(secs as i64, 0) {
        Some(time) => time.format("%a %Y-%m-%d %H:%M:%S UTC").to_string(),
        None => secs.to_string(),
    }
}

pub fn superblock_report(sb: &Ext2Superblock) -> MetadataReport {
    let inode = ReportSection::new("Inode")
        .field("Inode size", sb.inode.inode_size)
        .field("Number of inodes", sb.inode.inodes_count)
        .field("First inode", sb.inode.first_ino)
        .field("Inodes per group", sb.inode.inodes_per_group)
        .field("Free inodes", sb.inode.free_inodes_count);

    let block = ReportSection::new("Block")
        .field("Block size", sb.block_size())
        .field("Reserved blocks", sb.block.reserved_blocks_count)
        .field("Free blocks", sb.block.free_blocks_count)
        .field("Total blocks", sb.block.blocks_count)
        .field("First data block", sb.block.first_data_block)
        .field("Blocks per group", sb.block.blocks_per_group)
        .field("Fragments per group", sb.block.frags_per_group);

    let volume = ReportSection::new("Volume")
        .field("Volume name", sb.volume.name())
        .field("Last checked", format_timestamp(sb.volume.last_check))
        .field("Last mounted", format_timestamp(sb.volume.last_mount))
        .field("Last written", format_timestamp(sb.volume.last_write));

    MetadataReport::new(FilesystemKind::Ext2)
        .section(inode)
        .section(block)
        .section(volume)
}
