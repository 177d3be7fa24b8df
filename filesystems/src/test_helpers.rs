// Test helpers for filesystem testing
// Builds small EXT2 and FAT16 images in memory. Only std is used here so the
// integration tests can include! this file as well.

use std::collections::BTreeMap;

pub const EXT2_ROOT: u32 = 2;
pub const EXT2_FT_REG_FILE: u8 = 1;
pub const EXT2_FT_DIR: u8 = 2;

const EXT2_INODES: u32 = 32;
const EXT2_INODE_SIZE: u32 = 128;
const EXT2_FIRST_INO: u32 = 11;

fn put_u16(buf: &mut [u8], at: usize, value: u16) {
    buf[at..at + 2].copy_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, value: u32) {
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

#[derive(Debug, Clone)]
struct Ext2Node {
    is_dir: bool,
    size: u32,
    /// (name, inode, file type) in on-disk order; directories only
    entries: Vec<(Vec<u8>, u32, u8)>,
}

/// Single-filesystem EXT2 image with 32 inodes of 128 bytes.
pub struct Ext2ImageBuilder {
    block_size: u32,
    inodes_per_group: u32,
    revision: u32,
    volume_name: Vec<u8>,
    timestamps: [u32; 3],
    nodes: BTreeMap<u32, Ext2Node>,
    next_inode: u32,
}

/// A built EXT2 image and where its directory blocks ended up.
pub struct Ext2Image {
    pub bytes: Vec<u8>,
    pub block_size: u32,
    pub dir_blocks: BTreeMap<u32, Vec<u32>>,
}

impl Ext2Image {
    /// Byte offset of the `index`th data block of directory `inode`.
    pub fn dir_block_offset(&self, inode: u32, index: usize) -> usize {
        self.dir_blocks[&inode][index] as usize * self.block_size as usize
    }
}

impl Ext2ImageBuilder {
    pub fn new() -> Self {
        let mut nodes = BTreeMap::new();
        nodes.insert(
            EXT2_ROOT,
            Ext2Node {
                is_dir: true,
                size: 0,
                entries: vec![
                    (b".".to_vec(), EXT2_ROOT, EXT2_FT_DIR),
                    (b"..".to_vec(), EXT2_ROOT, EXT2_FT_DIR),
                ],
            },
        );
        Self {
            block_size: 1024,
            inodes_per_group: EXT2_INODES,
            revision: 1,
            volume_name: b"volprobe".to_vec(),
            timestamps: [0, 0, 0],
            nodes,
            next_inode: EXT2_FIRST_INO,
        }
    }

    pub fn block_size(&mut self, block_size: u32) -> &mut Self {
        self.block_size = block_size;
        self
    }

    /// Splitting the 32 inodes over several groups gives each group its own inode table.
    pub fn inodes_per_group(&mut self, count: u32) -> &mut Self {
        assert!(count > 0 && EXT2_INODES % count == 0);
        self.inodes_per_group = count;
        self
    }

    pub fn revision(&mut self, revision: u32) -> &mut Self {
        self.revision = revision;
        self
    }

    pub fn volume_name(&mut self, name: &[u8]) -> &mut Self {
        self.volume_name = name.to_vec();
        self
    }

    /// Last check, last mount and last write times.
    pub fn timestamps(&mut self, check: u32, mount: u32, write: u32) -> &mut Self {
        self.timestamps = [check, mount, write];
        self
    }

    fn allocate_inode(&mut self) -> u32 {
        let inode = self.next_inode;
        assert!(inode <= EXT2_INODES, "test image is out of inodes");
        self.next_inode += 1;
        inode
    }

    /// Link an arbitrary entry into `parent`.
    pub fn add_entry(&mut self, parent: u32, name: &str, inode: u32, file_type: u8) -> &mut Self {
        self.nodes
            .get_mut(&parent)
            .filter(|node| node.is_dir)
            .expect("parent must be a directory")
            .entries
            .push((name.as_bytes().to_vec(), inode, file_type));
        self
    }

    pub fn add_file(&mut self, parent: u32, name: &str, size: u32) -> u32 {
        let inode = self.allocate_inode();
        self.nodes.insert(inode, Ext2Node { is_dir: false, size, entries: Vec::new() });
        self.add_entry(parent, name, inode, EXT2_FT_REG_FILE);
        inode
    }

    pub fn add_dir(&mut self, parent: u32, name: &str) -> u32 {
        let inode = self.allocate_inode();
        self.nodes.insert(
            inode,
            Ext2Node {
                is_dir: true,
                size: 0,
                entries: vec![(b".".to_vec(), inode, EXT2_FT_DIR), (b"..".to_vec(), parent, EXT2_FT_DIR)],
            },
        );
        self.add_entry(parent, name, inode, EXT2_FT_DIR);
        inode
    }

    /// Pack entries into blocks; the last entry of each block absorbs the slack.
    fn layout_entries(&self, entries: &[(Vec<u8>, u32, u8)]) -> Vec<Vec<(usize, u16)>> {
        let bs = self.block_size as usize;
        let mut blocks: Vec<Vec<(usize, u16)>> = vec![Vec::new()];
        let mut used = 0usize;
        for (index, (name, _, _)) in entries.iter().enumerate() {
            let need = (8 + name.len() + 3) & !3;
            if used + need > bs {
                blocks.push(Vec::new());
                used = 0;
            }
            blocks.last_mut().unwrap().push((index, need as u16));
            used += need;
        }
        for block in &mut blocks {
            let total: usize = block.iter().map(|&(_, len)| len as usize).sum();
            if let Some(last) = block.last_mut() {
                last.1 += (bs - total) as u16;
            }
        }
        blocks
    }

    pub fn build(&self) -> Ext2Image {
        let bs = self.block_size;
        let bsz = bs as usize;
        let ipg = self.inodes_per_group;
        let groups = EXT2_INODES / ipg;
        let first_data_block = if bs == 1024 { 1 } else { 0 };
        let gdt_block = first_data_block + 1;
        let block_bitmap = gdt_block + 1;
        let inode_bitmap = block_bitmap + 1;
        let table_blocks = (ipg * EXT2_INODE_SIZE).div_ceil(bs);
        let inode_table = |group: u32| inode_bitmap + 1 + group * table_blocks;
        let mut next_block = inode_table(groups);

        let mut layouts = BTreeMap::new();
        let mut dir_blocks = BTreeMap::new();
        for (&inode, node) in &self.nodes {
            if node.is_dir {
                let layout = self.layout_entries(&node.entries);
                assert!(layout.len() <= 12, "directory needs indirect blocks");
                let blocks: Vec<u32> = (0..layout.len() as u32).map(|i| next_block + i).collect();
                next_block += layout.len() as u32;
                dir_blocks.insert(inode, blocks);
                layouts.insert(inode, layout);
            }
        }

        let total_blocks = next_block + 4;
        let mut bytes = vec![0u8; total_blocks as usize * bsz];

        // Superblock
        let sb = 1024;
        let used_inodes = self.nodes.len() as u32 + (EXT2_FIRST_INO - 2);
        put_u32(&mut bytes, sb, EXT2_INODES);
        put_u32(&mut bytes, sb + 4, total_blocks);
        put_u32(&mut bytes, sb + 8, 0);
        put_u32(&mut bytes, sb + 12, total_blocks - next_block);
        put_u32(&mut bytes, sb + 16, EXT2_INODES - used_inodes);
        put_u32(&mut bytes, sb + 20, first_data_block);
        put_u32(&mut bytes, sb + 24, (bs / 1024).trailing_zeros());
        put_u32(&mut bytes, sb + 28, (bs / 1024).trailing_zeros());
        put_u32(&mut bytes, sb + 32, bs * 8);
        put_u32(&mut bytes, sb + 36, bs * 8);
        put_u32(&mut bytes, sb + 40, ipg);
        put_u32(&mut bytes, sb + 44, self.timestamps[1]);
        put_u32(&mut bytes, sb + 48, self.timestamps[2]);
        put_u16(&mut bytes, sb + 56, 0xEF53);
        put_u16(&mut bytes, sb + 58, 1);
        put_u32(&mut bytes, sb + 64, self.timestamps[0]);
        put_u32(&mut bytes, sb + 76, self.revision);
        if self.revision > 0 {
            put_u32(&mut bytes, sb + 84, EXT2_FIRST_INO);
            put_u16(&mut bytes, sb + 88, EXT2_INODE_SIZE as u16);
        }
        let name_len = self.volume_name.len().min(16);
        bytes[sb + 120..sb + 120 + name_len].copy_from_slice(&self.volume_name[..name_len]);

        // Group descriptors
        for group in 0..groups {
            let at = gdt_block as usize * bsz + group as usize * 32;
            put_u32(&mut bytes, at, block_bitmap);
            put_u32(&mut bytes, at + 4, inode_bitmap);
            put_u32(&mut bytes, at + 8, inode_table(group));
            put_u16(&mut bytes, at + 12, 0);
            put_u16(&mut bytes, at + 14, 0);
        }

        // Inodes
        for (&inode, node) in &self.nodes {
            let group = (inode - 1) / ipg;
            let index = (inode - 1) % ipg;
            let at = inode_table(group) as usize * bsz + (index * EXT2_INODE_SIZE) as usize;
            if node.is_dir {
                let blocks = &dir_blocks[&inode];
                put_u16(&mut bytes, at, 0x41ED);
                put_u32(&mut bytes, at + 4, blocks.len() as u32 * bs);
                put_u16(&mut bytes, at + 26, 2);
                put_u32(&mut bytes, at + 28, blocks.len() as u32 * bs / 512);
                for (i, &block) in blocks.iter().enumerate() {
                    put_u32(&mut bytes, at + 40 + i * 4, block);
                }
            } else {
                put_u16(&mut bytes, at, 0x81A4);
                put_u32(&mut bytes, at + 4, node.size);
                put_u16(&mut bytes, at + 26, 1);
            }
        }

        // Directory blocks
        for (inode, layout) in &layouts {
            let entries = &self.nodes[inode].entries;
            for (block, slots) in dir_blocks[inode].iter().zip(layout) {
                let mut at = *block as usize * bsz;
                for &(index, rec_len) in slots {
                    let (name, target, file_type) = &entries[index];
                    put_u32(&mut bytes, at, *target);
                    put_u16(&mut bytes, at + 4, rec_len);
                    bytes[at + 6] = name.len() as u8;
                    bytes[at + 7] = *file_type;
                    bytes[at + 8..at + 8 + name.len()].copy_from_slice(name);
                    at += rec_len as usize;
                }
            }
        }

        Ext2Image { bytes, block_size: bs, dir_blocks }
    }
}

/// A directory in a FAT16 test image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatDir {
    Root,
    Cluster(u16),
}

pub const FAT_BYTES_PER_SECTOR: usize = 512;
pub const FAT_RESERVED_SECTORS: usize = 1;
pub const FAT_NUM_FATS: usize = 2;
pub const FAT_SECTORS_PER_FAT: usize = 8;
pub const FAT_ROOT_ENTRIES: usize = 64;
pub const FAT_TOTAL_SECTORS: usize = 2048;
const FAT_SLOTS_PER_CLUSTER: usize = FAT_BYTES_PER_SECTOR / 32;

/// 1 MiB FAT16 image: 512-byte sectors, one sector per cluster, 64 root entries.
pub struct Fat16ImageBuilder {
    image: Vec<u8>,
    root_used: usize,
    /// First cluster -> (cluster chain, slots used)
    dirs: BTreeMap<u16, (Vec<u16>, usize)>,
    next_cluster: u16,
}

/// Pad "NAME.EXT" into the 11-byte on-disk form.
pub fn fat_short_name(name: &str) -> [u8; 11] {
    let mut out = [b' '; 11];
    if name == "." || name == ".." {
        out[..name.len()].copy_from_slice(name.as_bytes());
        return out;
    }
    let (base, ext) = match name.rfind('.') {
        Some(pos) => (&name[..pos], &name[pos + 1..]),
        None => (name, ""),
    };
    for (i, b) in base.bytes().take(8).enumerate() {
        out[i] = b.to_ascii_uppercase();
    }
    for (i, b) in ext.bytes().take(3).enumerate() {
        out[8 + i] = b.to_ascii_uppercase();
    }
    out
}

pub fn fat_lfn_checksum(short_name: &[u8; 11]) -> u8 {
    short_name
        .iter()
        .fold(0u8, |sum, &b| ((sum >> 1) | (sum << 7)).wrapping_add(b))
}

fn fat_short_entry(name: &[u8; 11], attributes: u8, cluster: u16, size: u32) -> [u8; 32] {
    let mut slot = [0u8; 32];
    slot[..11].copy_from_slice(name);
    slot[11] = attributes;
    put_u16(&mut slot, 26, cluster);
    put_u32(&mut slot, 28, size);
    slot
}

impl Fat16ImageBuilder {
    pub const ROOT: FatDir = FatDir::Root;

    pub fn new() -> Self {
        let mut image = vec![0u8; FAT_TOTAL_SECTORS * FAT_BYTES_PER_SECTOR];
        image[..3].copy_from_slice(&[0xEB, 0x3C, 0x90]);
        image[3..11].copy_from_slice(b"MSDOS5.0");
        put_u16(&mut image, 11, FAT_BYTES_PER_SECTOR as u16);
        image[13] = 1;
        put_u16(&mut image, 14, FAT_RESERVED_SECTORS as u16);
        image[16] = FAT_NUM_FATS as u8;
        put_u16(&mut image, 17, FAT_ROOT_ENTRIES as u16);
        put_u16(&mut image, 19, FAT_TOTAL_SECTORS as u16);
        image[21] = 0xF8;
        put_u16(&mut image, 22, FAT_SECTORS_PER_FAT as u16);
        put_u16(&mut image, 24, 32);
        put_u16(&mut image, 26, 2);
        image[38] = 0x29;
        put_u32(&mut image, 39, 0x1234_ABCD);
        image[43..54].copy_from_slice(b"VOLPROBE   ");
        image[54..62].copy_from_slice(b"FAT16   ");
        image[510] = 0x55;
        image[511] = 0xAA;

        let mut builder = Self { image, root_used: 0, dirs: BTreeMap::new(), next_cluster: 2 };
        builder.set_fat(0, 0xFFF8);
        builder.set_fat(1, 0xFFFF);
        builder
    }

    pub fn root_offset() -> usize {
        (FAT_RESERVED_SECTORS + FAT_NUM_FATS * FAT_SECTORS_PER_FAT) * FAT_BYTES_PER_SECTOR
    }

    pub fn cluster_offset(cluster: u16) -> usize {
        let root_sectors = FAT_ROOT_ENTRIES * 32 / FAT_BYTES_PER_SECTOR;
        let first_data = FAT_RESERVED_SECTORS + FAT_NUM_FATS * FAT_SECTORS_PER_FAT + root_sectors;
        (first_data + cluster as usize - 2) * FAT_BYTES_PER_SECTOR
    }

    pub fn fat_entry_offset(cluster: u16) -> usize {
        FAT_RESERVED_SECTORS * FAT_BYTES_PER_SECTOR + cluster as usize * 2
    }

    pub fn set_fat(&mut self, cluster: u16, value: u16) {
        for copy in 0..FAT_NUM_FATS {
            let at = Self::fat_entry_offset(cluster) + copy * FAT_SECTORS_PER_FAT * FAT_BYTES_PER_SECTOR;
            put_u16(&mut self.image, at, value);
        }
    }

    fn allocate_cluster(&mut self) -> u16 {
        let cluster = self.next_cluster;
        self.next_cluster += 1;
        self.set_fat(cluster, 0xFFFF);
        cluster
    }

    fn next_slot(&mut self, dir: FatDir) -> usize {
        match dir {
            FatDir::Root => {
                assert!(self.root_used < FAT_ROOT_ENTRIES, "root directory is full");
                let at = Self::root_offset() + self.root_used * 32;
                self.root_used += 1;
                at
            }
            FatDir::Cluster(first) => {
                let (chain, used) = self.dirs.get(&first).cloned().expect("unknown directory");
                let mut chain = chain;
                if used == chain.len() * FAT_SLOTS_PER_CLUSTER {
                    let cluster = self.allocate_cluster();
                    self.set_fat(*chain.last().unwrap(), cluster);
                    chain.push(cluster);
                }
                let at = Self::cluster_offset(chain[used / FAT_SLOTS_PER_CLUSTER]) + (used % FAT_SLOTS_PER_CLUSTER) * 32;
                self.dirs.insert(first, (chain, used + 1));
                at
            }
        }
    }

    /// Append a raw 32-byte slot; returns its byte offset.
    pub fn add_raw_slot(&mut self, dir: FatDir, slot: [u8; 32]) -> usize {
        let at = self.next_slot(dir);
        self.image[at..at + 32].copy_from_slice(&slot);
        at
    }

    /// Add a file by its 8.3 name; returns the entry's byte offset.
    pub fn add_file(&mut self, dir: FatDir, name: &str, size: u32) -> usize {
        self.add_raw_slot(dir, fat_short_entry(&fat_short_name(name), 0x20, 0, size))
    }

    /// Add a subdirectory with "." and ".."; returns its first cluster.
    pub fn add_dir(&mut self, dir: FatDir, name: &str) -> u16 {
        let cluster = self.allocate_cluster();
        self.dirs.insert(cluster, (vec![cluster], 0));
        let parent_cluster = match dir {
            FatDir::Root => 0,
            FatDir::Cluster(c) => c,
        };
        self.add_raw_slot(FatDir::Cluster(cluster), fat_short_entry(&fat_short_name("."), 0x10, cluster, 0));
        self.add_raw_slot(FatDir::Cluster(cluster), fat_short_entry(&fat_short_name(".."), 0x10, parent_cluster, 0));
        self.add_raw_slot(dir, fat_short_entry(&fat_short_name(name), 0x10, cluster, 0));
        cluster
    }

    /// Add a file with VFAT long-name slots ahead of its short entry; returns the short entry's offset.
    pub fn add_long_name_file(&mut self, dir: FatDir, long_name: &str, short_name: &str, size: u32) -> usize {
        let short = fat_short_name(short_name);
        let checksum = fat_lfn_checksum(&short);
        let mut units: Vec<u16> = long_name.encode_utf16().collect();
        if units.len() % 13 != 0 {
            units.push(0x0000);
            while units.len() % 13 != 0 {
                units.push(0xFFFF);
            }
        }
        let fragments = units.len() / 13;
        const OFFSETS: [usize; 13] = [1, 3, 5, 7, 9, 14, 16, 18, 20, 22, 24, 28, 30];
        for seq in (1..=fragments).rev() {
            let mut slot = [0u8; 32];
            slot[0] = seq as u8 | if seq == fragments { 0x40 } else { 0 };
            slot[11] = 0x0F;
            slot[13] = checksum;
            for (i, &offset) in OFFSETS.iter().enumerate() {
                put_u16(&mut slot, offset, units[(seq - 1) * 13 + i]);
            }
            self.add_raw_slot(dir, slot);
        }
        self.add_raw_slot(dir, fat_short_entry(&short, 0x20, 0, size))
    }

    pub fn add_volume_label(&mut self, label: &str) -> usize {
        let mut name = [b' '; 11];
        for (i, b) in label.bytes().take(11).enumerate() {
            name[i] = b;
        }
        self.add_raw_slot(FatDir::Root, fat_short_entry(&name, 0x08, 0, 0))
    }

    pub fn image_mut(&mut self) -> &mut [u8] {
        &mut self.image
    }

    pub fn build(&self) -> Vec<u8> {
        self.image.clone()
    }
}
