// Filesystem families organization
pub mod families;

pub mod detection;
pub mod endian;
pub mod ops;
pub mod search;

#[cfg(test)]
pub mod test_helpers;

pub use families::ext::ext2::{Ext2Detector, Ext2Ops, Ext2Reader};
pub use families::fat::fat16::{Fat16Detector, Fat16Navigator, Fat16Ops};

pub use detection::{detect_filesystem, FilesystemDetector};
pub use ops::{execute, ops_for, FilesystemOps};
pub use search::{SearchContext, SearchHit, SearchMode};
