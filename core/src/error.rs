use thiserror::Error;

#[derive(Debug, Error)]
pub enum VolprobeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Short read at offset {offset:#x}: wanted {expected} bytes, got {actual}")]
    ShortRead {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("Unrecognized filesystem: neither FAT16 nor EXT2")]
    UnrecognizedFormat,

    #[error("Corrupt volume: {0}")]
    Corrupt(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not supported: {0}")]
    NotSupported(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl VolprobeError {
    /// Errors caused by the image contents rather than the host.
    /// A traversal that hits one of these abandons the current branch only.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, VolprobeError::ShortRead { .. } | VolprobeError::Corrupt(_))
    }
}

pub type VolprobeResult<T> = Result<T, VolprobeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let short = VolprobeError::ShortRead { offset: 1024, expected: 8, actual: 3 };
        assert!(short.is_recoverable());
        assert!(VolprobeError::Corrupt("zero rec_len".into()).is_recoverable());
        assert!(!VolprobeError::InvalidInput("empty name".into()).is_recoverable());
        assert!(!VolprobeError::UnrecognizedFormat.is_recoverable());

        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        assert!(!VolprobeError::from(io).is_recoverable());
    }

    #[test]
    fn test_short_read_message() {
        let err = VolprobeError::ShortRead { offset: 0x400, expected: 1024, actual: 12 };
        assert_eq!(err.to_string(), "Short read at offset 0x400: wanted 1024 bytes, got 12");
    }
}
