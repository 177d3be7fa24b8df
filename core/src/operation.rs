use crate::report::MetadataReport;
use crate::VolprobeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What the caller asked to do with the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Info,
    Find,
    Delete,
}

impl Operation {
    pub fn requires_target(&self) -> bool {
        !matches!(self, Operation::Info)
    }

    pub fn is_destructive(&self) -> bool {
        matches!(self, Operation::Delete)
    }
}

impl FromStr for Operation {
    type Err = VolprobeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the older slash-prefixed spelling as well
        let name = s.strip_prefix('/').unwrap_or(s);
        match name.to_ascii_lowercase().as_str() {
            "info" => Ok(Operation::Info),
            "find" => Ok(Operation::Find),
            "delete" => Ok(Operation::Delete),
            _ => Err(VolprobeError::InvalidInput(format!("unknown operation '{}'", s))),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Info => "info",
            Operation::Find => "find",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilesystemKind {
    Ext2,
    Fat16,
    Unknown,
}

impl fmt::Display for FilesystemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilesystemKind::Ext2 => "EXT2",
            FilesystemKind::Fat16 => "FAT16",
            FilesystemKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Result of one dispatched operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    MetadataReport(MetadataReport),
    FileSizeFound(u32),
    NotFound,
    Deleted,
    UnrecognizedFormat,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::MetadataReport(report) => write!(f, "{}", report),
            Outcome::FileSizeFound(size) => write!(f, "File found! Size: {} bytes", size),
            Outcome::NotFound => f.write_str("Error. File not found."),
            Outcome::Deleted => f.write_str("The file has been deleted."),
            Outcome::UnrecognizedFormat => f.write_str("Error. Volume format not recognized (neither FAT16 nor EXT2)."),
        }
    }
}
