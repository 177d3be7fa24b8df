use serde::{Deserialize, Serialize};

/// How FAT16 long names are recovered from the slots before a short entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LfnMode {
    /// Follow the whole run of long-name slots, validating order and checksum.
    #[default]
    Chain,
    /// Read 13 fixed byte positions from the single preceding slot, unvalidated.
    PrecedingSlot,
}

/// Tuning for directory traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Deepest directory level searched below the root.
    pub max_depth: usize,
    pub lfn_mode: LfnMode,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            lfn_mode: LfnMode::Chain,
        }
    }
}
