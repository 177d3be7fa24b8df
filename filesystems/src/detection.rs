// Filesystem detection trait and utilities

use log::{debug, info};
use volprobe_core::{FilesystemKind, Volume, VolprobeError, VolumeOffset};

use crate::families::ext::ext2::Ext2Detector;
use crate::families::fat::fat16::Fat16Detector;

pub const BOOT_SECTOR_PROBE_LEN: usize = 512;
pub const EXT_SUPERBLOCK_OFFSET: u64 = 1024;
pub const EXT_SUPERBLOCK_PROBE_LEN: usize = 1024;

/// Trait for filesystem-specific detection logic
pub trait FilesystemDetector {
    /// Check if the given boot sector and optional superblock region match this filesystem
    ///
    /// # Parameters
    /// - `boot_sector`: up to the first 512 bytes of the volume
    /// - `ext_superblock`: bytes starting at offset 1024, if the volume reaches that far
    ///
    /// # Returns
    /// - `Some(kind)` if detected
    /// - `None` if not this filesystem
    fn detect(boot_sector: &[u8], ext_superblock: Option<&[u8]>) -> Option<FilesystemKind>;
}

/// Read whatever prefix of the two probe regions exists. Never fails on a short image.
pub fn read_detection_data(volume: &mut dyn Volume) -> Result<(Vec<u8>, Option<Vec<u8>>), VolprobeError> {
    let boot_sector = volume.read_available_at(VolumeOffset::new(0), BOOT_SECTOR_PROBE_LEN)?;

    let ext_superblock = volume.read_available_at(VolumeOffset::new(EXT_SUPERBLOCK_OFFSET), EXT_SUPERBLOCK_PROBE_LEN)?;
    let ext_superblock = if ext_superblock.is_empty() { None } else { Some(ext_superblock) };

    debug!(
        "Probe read {} boot sector bytes, {} superblock bytes",
        boot_sector.len(),
        ext_superblock.as_ref().map_or(0, |sb| sb.len())
    );
    Ok((boot_sector, ext_superblock))
}

/// Classify the volume. The two probes are independent; FAT16 is tried first.
pub fn detect_filesystem(volume: &mut dyn Volume) -> Result<FilesystemKind, VolprobeError> {
    let (boot_sector, ext_superblock) = read_detection_data(volume)?;

    let kind = Fat16Detector::detect(&boot_sector, ext_superblock.as_deref())
        .or_else(|| Ext2Detector::detect(&boot_sector, ext_superblock.as_deref()))
        .unwrap_or(FilesystemKind::Unknown);

    info!("Detected filesystem: {}", kind);
    Ok(kind)
}
