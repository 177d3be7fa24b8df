// Building blocks shared by the FAT variants: on-disk constants and the 32-byte directory entry

pub mod constants;
pub mod structures;

pub use constants::*;
pub use structures::*;
