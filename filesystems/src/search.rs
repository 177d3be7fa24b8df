// Per-invocation search state shared by every recursive frame of a traversal

use log::warn;
use std::collections::HashSet;
use volprobe_core::{ScanOptions, VolumeOffset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Find,
    Delete,
}

/// The directory entry a search settled on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub name: String,
    pub size: u32,
    /// Absolute position of the directory entry that named the file.
    pub location: VolumeOffset,
    pub deleted: bool,
}

/// Mutable state threaded through one find or delete.
///
/// Directory identifiers are inode numbers on EXT2 and first cluster numbers
/// on FAT16 (the FAT16 root directory uses 0). A directory is entered at most
/// once per search, and never deeper than `max_depth` levels below the root.
#[derive(Debug)]
pub struct SearchContext {
    target: String,
    mode: SearchMode,
    max_depth: usize,
    visited: HashSet<u64>,
    directories_visited: usize,
    hit: Option<SearchHit>,
}

impl SearchContext {
    pub fn new(target: impl Into<String>, mode: SearchMode, options: &ScanOptions) -> Self {
        Self {
            target: target.into(),
            mode,
            max_depth: options.max_depth,
            visited: HashSet::new(),
            directories_visited: 0,
            hit: None,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn is_done(&self) -> bool {
        self.hit.is_some()
    }

    /// Claim a directory for scanning. Returns false when the directory was
    /// already scanned in this search or lies beyond the depth limit.
    pub fn enter_directory(&mut self, id: u64, depth: usize) -> bool {
        if depth > self.max_depth {
            warn!("Directory {} is {} levels deep (limit {}), skipping", id, depth, self.max_depth);
            return false;
        }
        if !self.visited.insert(id) {
            warn!("Directory {} already visited, directory tree has a cycle", id);
            return false;
        }
        self.directories_visited += 1;
        true
    }

    pub fn record_hit(&mut self, hit: SearchHit) {
        self.hit = Some(hit);
    }

    pub fn hit(&self) -> Option<&SearchHit> {
        self.hit.as_ref()
    }

    pub fn into_hit(self) -> Option<SearchHit> {
        self.hit
    }

    pub fn directories_visited(&self) -> usize {
        self.directories_visited
    }
}
