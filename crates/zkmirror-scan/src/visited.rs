//! Directory identity tracking for symlink-following scans.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

/// Identity of a directory independent of the path used to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DirId {
    /// Device and inode number.
    Inode { device: u64, inode: u64 },
    /// Canonical path, where inodes are unavailable.
    Canonical(PathBuf),
}

impl DirId {
    /// Identify the directory at `path`, following symlinks.
    #[cfg(unix)]
    pub fn of(path: &Path) -> std::io::Result<Self> {
        let metadata = std::fs::metadata(path)?;
        Ok(Self::Inode {
            device: metadata.dev(),
            inode: metadata.ino(),
        })
    }

    #[cfg(not(unix))]
    pub fn of(path: &Path) -> std::io::Result<Self> {
        path.canonicalize().map(Self::Canonical)
    }
}

/// Tracks directories already entered so symlink cycles are walked once.
#[derive(Debug, Default)]
pub struct VisitedDirs {
    seen: HashSet<DirId>,
}

impl VisitedDirs {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a directory. Returns `true` the first time it is seen.
    pub fn track(&mut self, id: DirId) -> bool {
        self.seen.insert(id)
    }

    /// Number of distinct directories tracked.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Check if nothing has been tracked.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
