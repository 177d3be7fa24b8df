pub mod config;
pub mod error;
pub mod offset;
pub mod operation;
pub mod report;
pub mod volume;

pub use config::{LfnMode, ScanOptions};
pub use error::{VolprobeError, VolprobeResult};
pub use offset::{BlockOffset, VolumeOffset};
pub use operation::{FilesystemKind, Operation, Outcome};
pub use report::{MetadataReport, ReportField, ReportSection};
pub use volume::Volume;
