// FAT Filesystem Family
// FAT16 is the only variant handled; FAT12 and FAT32 volumes are not recognized.

pub mod common;
pub mod fat16;
