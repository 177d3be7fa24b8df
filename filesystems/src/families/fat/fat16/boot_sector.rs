// FAT16 boot sector and volume geometry

use log::{debug, trace};
use volprobe_core::{Volume, VolprobeError, VolprobeResult, VolumeOffset};

use crate::endian::LeFields;
use crate::families::fat::common::*;

/// BIOS Parameter Block fields needed to locate directories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Fat16Params {
    pub oem_name: [u8; 8],
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub num_fats: u8,
    pub root_entry_count: u16,
    pub total_sectors_16: u16,
    pub media: u8,
    pub sectors_per_fat: u16,
    pub total_sectors_32: u32,
    pub volume_id: u32,
    pub volume_label: [u8; 11],
    pub fs_type: [u8; 8],
}

/// Space-padded text field as ISO-8859-1, trailing padding removed.
fn padded_text(bytes: &[u8]) -> String {
    bytes
        .iter()
        .take_while(|&&b| b != 0)
        .map(|&b| b as char)
        .collect::<String>()
        .trim_end()
        .to_string()
}

impl Fat16Params {
    /// Decode from the boot sector. Fields missing from a short buffer decode as 0.
    pub fn parse(buf: &[u8]) -> Self {
        Self {
            oem_name: buf.bytes_at::<8>(BS_OEM_NAME),
            bytes_per_sector: buf.le_u16(BPB_BYTES_PER_SEC),
            sectors_per_cluster: buf.le_u8(BPB_SEC_PER_CLUS),
            reserved_sectors: buf.le_u16(BPB_RSVD_SEC_CNT),
            num_fats: buf.le_u8(BPB_NUM_FATS),
            root_entry_count: buf.le_u16(BPB_ROOT_ENT_CNT),
            total_sectors_16: buf.le_u16(BPB_TOT_SEC16),
            media: buf.le_u8(BPB_MEDIA),
            sectors_per_fat: buf.le_u16(BPB_FAT_SZ16),
            total_sectors_32: buf.le_u32(BPB_TOT_SEC32),
            volume_id: buf.le_u32(BS16_VOL_ID),
            volume_label: buf.bytes_at::<11>(BS16_VOL_LAB),
            fs_type: buf.bytes_at::<8>(BS16_FIL_SYS_TYPE),
        }
    }

    pub fn oem_name(&self) -> String {
        padded_text(&self.oem_name)
    }

    pub fn label(&self) -> String {
        padded_text(&self.volume_label)
    }

    pub fn total_sectors(&self) -> u32 {
        if self.total_sectors_16 != 0 {
            self.total_sectors_16 as u32
        } else {
            self.total_sectors_32
        }
    }

    /// Reject geometry that would make offset arithmetic meaningless.
    pub fn validate(&self) -> VolprobeResult<()> {
        if self.bytes_per_sector == 0 {
            return Err(VolprobeError::Corrupt("bytes per sector is zero".to_string()));
        }
        if self.sectors_per_cluster == 0 {
            return Err(VolprobeError::Corrupt("sectors per cluster is zero".to_string()));
        }
        Ok(())
    }

    fn sectors_before_root(&self) -> u64 {
        self.reserved_sectors as u64 + self.num_fats as u64 * self.sectors_per_fat as u64
    }

    /// Sectors occupied by the fixed root directory, rounded up.
    pub fn root_dir_sectors(&self) -> u64 {
        let bps = self.bytes_per_sector as u64;
        if bps == 0 {
            return 0;
        }
        (self.root_entry_count as u64 * DIR_ENTRY_SIZE as u64).div_ceil(bps)
    }

    pub fn first_data_sector(&self) -> u64 {
        self.sectors_before_root() + self.root_dir_sectors()
    }

    pub fn cluster_size(&self) -> u64 {
        self.sectors_per_cluster as u64 * self.bytes_per_sector as u64
    }

    /// Root directory: right after the reserved area and the FAT copies.
    pub fn calculate_root_directory(&self) -> VolumeOffset {
        VolumeOffset::new(self.sectors_before_root() * self.bytes_per_sector as u64)
    }

    /// First byte of a data cluster. Clusters 0 and 1 do not exist in the data region.
    pub fn calculate_cluster_offset(&self, cluster: u16) -> VolprobeResult<VolumeOffset> {
        if cluster < FIRST_DATA_CLUSTER {
            return Err(VolprobeError::Corrupt(format!("cluster {} is not a data cluster", cluster)));
        }
        let first_sector_of_cluster =
            (cluster - FIRST_DATA_CLUSTER) as u64 * self.sectors_per_cluster as u64 + self.first_data_sector();
        Ok(VolumeOffset::new(first_sector_of_cluster * self.bytes_per_sector as u64))
    }

    /// Location of a cluster's entry in the first FAT copy.
    pub fn fat_entry_offset(&self, cluster: u16) -> VolumeOffset {
        VolumeOffset::new(self.reserved_sectors as u64 * self.bytes_per_sector as u64 + cluster as u64 * 2)
    }
}

/// Read and validate the boot sector for traversal.
pub fn read_system(volume: &mut dyn Volume) -> VolprobeResult<Fat16Params> {
    let buf = volume.read_vec_at(VolumeOffset::new(0), BOOT_SECTOR_LEN)?;
    let params = Fat16Params::parse(&buf);
    params.validate()?;
    debug!(
        "FAT16 geometry: {} bytes/sector, {} sectors/cluster, {} reserved, {} FATs of {} sectors, {} root entries",
        params.bytes_per_sector,
        params.sectors_per_cluster,
        params.reserved_sectors,
        params.num_fats,
        params.sectors_per_fat,
        params.root_entry_count
    );
    Ok(params)
}

/// Read whatever part of the boot sector exists; missing fields are zero.
pub fn read_system_best_effort(volume: &mut dyn Volume) -> VolprobeResult<Fat16Params> {
    let buf = volume.read_available_at(VolumeOffset::new(0), BOOT_SECTOR_LEN)?;
    Ok(Fat16Params::parse(&buf))
}

/// Follow the FAT from `cluster`. `None` at end of chain.
pub fn next_cluster(volume: &mut dyn Volume, params: &Fat16Params, cluster: u16) -> VolprobeResult<Option<u16>> {
    let buf = volume.read_vec_at(params.fat_entry_offset(cluster), 2)?;
    let next = buf.le_u16(0);
    trace!("FAT[{}] = {:#06x}", cluster, next);

    match next {
        n if n >= FAT16_EOC => Ok(None),
        FAT16_BAD => Err(VolprobeError::Corrupt(format!("cluster {} chains to a bad cluster", cluster))),
        n if n < FIRST_DATA_CLUSTER => Err(VolprobeError::Corrupt(format!(
            "cluster {} chains to reserved value {:#06x}",
            cluster, n
        ))),
        n => Ok(Some(n)),
    }
}
