// Uniform filesystem operations
// Each supported format implements FilesystemOps; `execute` picks the backend
// for a volume and runs one operation through it.

use log::{info, warn};
use volprobe_core::{
    FilesystemKind, MetadataReport, Operation, Outcome, ScanOptions, Volume, VolprobeError, VolprobeResult,
};

use crate::detection::detect_filesystem;
use crate::families::ext::ext2::Ext2Ops;
use crate::families::fat::fat16::Fat16Ops;
use crate::search::{SearchContext, SearchHit, SearchMode};

/// Operations every backend supports.
///
/// The volume is borrowed per call; backends never open or close it.
pub trait FilesystemOps {
    fn filesystem_kind(&self) -> FilesystemKind;

    fn options(&self) -> &ScanOptions;

    /// Best-effort metadata report. Missing fields read as zero.
    fn info(&mut self, volume: &mut dyn Volume) -> VolprobeResult<MetadataReport>;

    /// Walk the directory tree from the root, recording at most one hit in `ctx`.
    fn search(&mut self, volume: &mut dyn Volume, ctx: &mut SearchContext) -> VolprobeResult<()>;

    /// Locate `name` anywhere in the tree.
    fn find(&mut self, volume: &mut dyn Volume, name: &str) -> VolprobeResult<Option<SearchHit>> {
        self.run_search(volume, name, SearchMode::Find)
    }

    /// Locate `name` and unlink its directory entry.
    fn delete(&mut self, volume: &mut dyn Volume, name: &str) -> VolprobeResult<Option<SearchHit>> {
        if is_dot_name(name) {
            return Err(VolprobeError::InvalidInput(format!("refusing to delete '{}'", name)));
        }
        self.run_search(volume, name, SearchMode::Delete)
    }

    #[doc(hidden)]
    fn run_search(&mut self, volume: &mut dyn Volume, name: &str, mode: SearchMode) -> VolprobeResult<Option<SearchHit>> {
        let mut ctx = SearchContext::new(name, mode, self.options());
        match self.search(volume, &mut ctx) {
            Ok(()) => {}
            Err(e) if e.is_recoverable() => {
                warn!("{} search for '{}' aborted: {}", self.filesystem_kind(), name, e);
            }
            Err(e) => return Err(e),
        }
        info!(
            "{} search for '{}' visited {} directories",
            self.filesystem_kind(),
            name,
            ctx.directories_visited()
        );
        Ok(ctx.into_hit())
    }
}

fn is_dot_name(name: &str) -> bool {
    name == "." || name == ".."
}

/// Build the backend for a detected filesystem.
pub fn ops_for(kind: FilesystemKind, options: &ScanOptions) -> Option<Box<dyn FilesystemOps>> {
    match kind {
        FilesystemKind::Ext2 => Some(Box::new(Ext2Ops::new(options.clone()))),
        FilesystemKind::Fat16 => Some(Box::new(Fat16Ops::new(options.clone()))),
        FilesystemKind::Unknown => None,
    }
}

/// Detect the volume format and run one operation on it.
pub fn execute(
    operation: Operation,
    target: Option<&str>,
    volume: &mut dyn Volume,
    options: &ScanOptions,
) -> VolprobeResult<Outcome> {
    let target = match (operation.requires_target(), target) {
        (false, _) => None,
        (true, Some(name)) if !name.is_empty() => Some(name),
        (true, _) => {
            return Err(VolprobeError::InvalidInput(format!("{} needs a file name", operation)));
        }
    };
    if operation == Operation::Delete && target.map_or(false, is_dot_name) {
        return Err(VolprobeError::InvalidInput("refusing to delete '.' or '..'".to_string()));
    }

    let kind = detect_filesystem(volume)?;
    let mut ops = match ops_for(kind, options) {
        Some(ops) => ops,
        None => return Ok(Outcome::UnrecognizedFormat),
    };
    info!("Running {} on {} volume", operation, kind);

    let outcome = match (operation, target) {
        (Operation::Info, _) => Outcome::MetadataReport(ops.info(volume)?),
        (Operation::Find, Some(name)) => match ops.find(volume, name)? {
            Some(hit) => Outcome::FileSizeFound(hit.size),
            None => Outcome::NotFound,
        },
        (Operation::Delete, Some(name)) => match ops.delete(volume, name)? {
            Some(hit) if hit.deleted => Outcome::Deleted,
            _ => Outcome::NotFound,
        },
        (_, None) => return Err(VolprobeError::InvalidInput(format!("{} needs a file name", operation))),
    };
    Ok(outcome)
}
