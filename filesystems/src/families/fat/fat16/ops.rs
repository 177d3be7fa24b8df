// FAT16 FilesystemOps implementation

use volprobe_core::{FilesystemKind, MetadataReport, ReportSection, ScanOptions, Volume, VolprobeResult};

use super::boot_sector::{read_system, read_system_best_effort, Fat16Params};
use super::navigator::Fat16Navigator;
use crate::ops::FilesystemOps;
use crate::search::SearchContext;

pub struct Fat16Ops {
    options: ScanOptions,
}

impl Fat16Ops {
    pub fn new(options: ScanOptions) -> Self {
        Self { options }
    }
}

impl FilesystemOps for Fat16Ops {
    fn filesystem_kind(&self) -> FilesystemKind {
        FilesystemKind::Fat16
    }

    fn options(&self) -> &ScanOptions {
        &self.options
    }

    fn info(&mut self, volume: &mut dyn Volume) -> VolprobeResult<MetadataReport> {
        let params = read_system_best_effort(volume)?;
        Ok(boot_sector_report(&params))
    }

    fn search(&mut self, volume: &mut dyn Volume, ctx: &mut SearchContext) -> VolprobeResult<()> {
        let params = read_system(volume)?;
        Fat16Navigator::new(volume, params, self.options.lfn_mode).search_root(ctx)
    }
}

pub fn boot_sector_report(params: &Fat16Params) -> MetadataReport {
    let section = ReportSection::new("Filesystem")
        .field("System name", params.oem_name())
        .field("Sector size", params.bytes_per_sector)
        .field("Sectors per cluster", params.sectors_per_cluster)
        .field("Reserved sectors", params.reserved_sectors)
        .field("Number of FATs", params.num_fats)
        .field("Max root entries", params.root_entry_count)
        .field("Sectors per FAT", params.sectors_per_fat)
        .field("Label", params.label());

    MetadataReport::new(FilesystemKind::Fat16).section(section)
}
