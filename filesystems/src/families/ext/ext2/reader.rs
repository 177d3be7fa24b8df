// EXT2 metadata reader
// Decodes the superblock, block group descriptors, inodes and directory entries
// straight from the volume. Nothing is cached between calls.

use log::{debug, trace};
use volprobe_core::{Volume, VolprobeError, VolprobeResult, VolumeOffset};

use super::constants::*;
use super::structures::*;

/// Read the superblock, failing with `ShortRead` if the image is truncated.
pub fn read_superblock(volume: &mut dyn Volume) -> VolprobeResult<Ext2Superblock> {
    let buf = volume.read_vec_at(VolumeOffset::new(SUPERBLOCK_OFFSET), SUPERBLOCK_SIZE)?;
    Ok(Ext2Superblock::parse(&buf))
}

/// Read whatever part of the superblock exists; missing fields are zero.
pub fn read_superblock_best_effort(volume: &mut dyn Volume) -> VolprobeResult<Ext2Superblock> {
    let buf = volume.read_available_at(VolumeOffset::new(SUPERBLOCK_OFFSET), SUPERBLOCK_SIZE)?;
    if buf.len() < SUPERBLOCK_SIZE {
        debug!("Superblock truncated to {} bytes", buf.len());
    }
    Ok(Ext2Superblock::parse(&buf))
}

/// Geometry-aware access to one EXT2 volume.
pub struct Ext2Reader<'v> {
    volume: &'v mut dyn Volume,
    superblock: Ext2Superblock,
    block_size: u32,
}

impl<'v> Ext2Reader<'v> {
    pub fn new(volume: &'v mut dyn Volume) -> VolprobeResult<Self> {
        let superblock = read_superblock(volume)?;
        if !superblock.is_valid_magic() {
            return Err(VolprobeError::Corrupt(format!(
                "bad superblock magic {:#06x}",
                superblock.magic
            )));
        }

        let block_size = superblock.block_size();
        if block_size == 0 {
            return Err(VolprobeError::Corrupt(format!(
                "unsupported block size exponent {}",
                superblock.block.log_block_size
            )));
        }
        if superblock.inode.inodes_per_group == 0 {
            return Err(VolprobeError::Corrupt("inodes per group is zero".to_string()));
        }

        debug!(
            "EXT2 geometry: block size {}, inode size {}, {} inodes per group",
            block_size, superblock.inode.inode_size, superblock.inode.inodes_per_group
        );

        Ok(Self { volume, superblock, block_size })
    }

    pub fn superblock(&self) -> &Ext2Superblock {
        &self.superblock
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn volume(&mut self) -> &mut dyn Volume {
        &mut *self.volume
    }

    /// Absolute offset of a block number.
    pub fn block_offset(&self, block: u32) -> VolprobeResult<VolumeOffset> {
        VolumeOffset::from_units(block as u64, self.block_size as u64)
            .ok_or_else(|| VolprobeError::Corrupt(format!("block {} out of range", block)))
    }

    /// The descriptor table starts in the block after the one holding the superblock.
    pub fn group_table_offset(&self) -> VolprobeResult<VolumeOffset> {
        let first = self.superblock.block.first_data_block;
        self.block_offset(first.saturating_add(1))
    }

    /// Read the descriptor for one block group.
    pub fn read_group_descriptor(&mut self, group: u32) -> VolprobeResult<GroupDescriptor> {
        let offset = self.group_table_offset()? + group as u64 * GROUP_DESC_SIZE as u64;
        let buf = self.volume.read_vec_at(offset, GROUP_DESC_SIZE)?;
        let desc = GroupDescriptor::parse(&buf);
        trace!("Group {} descriptor at {}: {:?}", group, offset, desc);
        Ok(desc)
    }

    /// The first group's descriptor; all a single-group volume has.
    pub fn read_block_group_table(&mut self) -> VolprobeResult<GroupDescriptor> {
        self.read_group_descriptor(0)
    }

    /// Resolve an inode number to its table entry.
    pub fn read_inode(&mut self, inode_num: u32) -> VolprobeResult<Ext2Inode> {
        let params = self.superblock.inode;
        if inode_num == 0 || (params.inodes_count != 0 && inode_num > params.inodes_count) {
            return Err(VolprobeError::Corrupt(format!("invalid inode number {}", inode_num)));
        }

        let group = (inode_num - 1) / params.inodes_per_group;
        let index = (inode_num - 1) % params.inodes_per_group;
        let desc = self.read_group_descriptor(group)?;

        let offset = self.block_offset(desc.inode_table)? + index as u64 * params.inode_size as u64;
        let buf = self.volume.read_vec_at(offset, INODE_RECORD_LEN)?;
        let inode = Ext2Inode::parse(&buf);
        trace!("Inode {} at {}: size {}, mode {:#o}", inode_num, offset, inode.size, inode.mode);
        Ok(inode)
    }

    /// Read one directory entry header plus its name bytes.
    pub fn read_dir_entry(&mut self, offset: VolumeOffset) -> VolprobeResult<DirEntry> {
        let header = self.volume.read_vec_at(offset, DIR_ENTRY_HEADER_LEN as usize)?;
        let (inode, rec_len, name_len, file_type) = DirEntry::parse_header(&header);
        let name = if name_len == 0 {
            Vec::new()
        } else {
            self.volume.read_vec_at(offset + DE_NAME as u64, name_len as usize)?
        };

        Ok(DirEntry { inode, rec_len, name_len, file_type, name })
    }
}
