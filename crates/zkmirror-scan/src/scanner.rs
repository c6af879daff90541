//! Stack-based search for payload files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use zkmirror_core::{DEFAULT_SENTINEL, MirrorWarning};

use crate::visited::{DirId, VisitedDirs};

/// Result of scanning a directory tree for payload files.
#[derive(Debug, Default)]
pub struct SentinelScan {
    /// Payload files found, in discovery order.
    pub files: Vec<PathBuf>,
    /// Directories that could not be read; their subtrees were skipped.
    pub warnings: Vec<MirrorWarning>,
    /// Directories successfully listed.
    pub dirs_scanned: u64,
}

/// Finds every file with the sentinel name below a root directory.
///
/// Traversal uses an explicit stack so depth is not limited by the call
/// stack. A directory that cannot be listed is reported as a warning and
/// skipped without aborting the scan.
#[derive(Debug, Clone)]
pub struct SentinelScanner {
    sentinel: String,
    follow_symlinks: bool,
}

impl SentinelScanner {
    /// Create a scanner looking for files named `sentinel`.
    pub fn new(sentinel: impl Into<String>) -> Self {
        Self {
            sentinel: sentinel.into(),
            follow_symlinks: false,
        }
    }

    /// Descend into symlinked directories.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Scan `root`.
    pub fn scan(&self, root: &Path) -> SentinelScan {
        self.scan_with(root, |dir| fs::read_dir(dir))
    }

    /// Scan `root`, listing each directory with `list_dir`.
    ///
    /// An error from `list_dir` is recorded as a warning for that directory
    /// and its subtree is skipped.
    pub fn scan_with<F>(&self, root: &Path, mut list_dir: F) -> SentinelScan
    where
        F: FnMut(&Path) -> io::Result<fs::ReadDir>,
    {
        let mut scan = SentinelScan::default();
        let mut visited = VisitedDirs::new();
        let mut stack = vec![root.to_path_buf()];

        while let Some(dir) = stack.pop() {
            if self.follow_symlinks && !self.first_visit(&dir, &mut visited) {
                debug!("Skipping already visited {}", dir.display());
                continue;
            }

            let entries = match list_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!("Error while scanning {}: {err}", dir.display());
                    scan.warnings.push(MirrorWarning::scan_failed(&dir, &err));
                    continue;
                }
            };
            scan.dirs_scanned += 1;

            for entry_result in entries {
                let entry = match entry_result {
                    Ok(entry) => entry,
                    Err(err) => {
                        warn!("Error while scanning {}: {err}", dir.display());
                        scan.warnings.push(MirrorWarning::scan_failed(&dir, &err));
                        continue;
                    }
                };

                let path = entry.path();
                let file_type = match entry.file_type() {
                    Ok(file_type) => file_type,
                    Err(err) => {
                        warn!("Error while scanning {}: {err}", path.display());
                        scan.warnings.push(MirrorWarning::scan_failed(&path, &err));
                        continue;
                    }
                };

                let (is_dir, is_file) = if file_type.is_symlink() {
                    // Resolve the target; broken links are neither.
                    match fs::metadata(&path) {
                        Ok(target) => (target.is_dir() && self.follow_symlinks, target.is_file()),
                        Err(_) => (false, false),
                    }
                } else {
                    (file_type.is_dir(), file_type.is_file())
                };

                if is_dir {
                    stack.push(path);
                } else if is_file && entry.file_name().to_str() == Some(self.sentinel.as_str()) {
                    scan.files.push(path);
                }
            }
        }

        scan
    }

    fn first_visit(&self, dir: &Path, visited: &mut VisitedDirs) -> bool {
        match DirId::of(dir) {
            Ok(id) => visited.track(id),
            // Let read_dir report the error.
            Err(_) => true,
        }
    }
}

impl Default for SentinelScanner {
    fn default() -> Self {
        Self::new(DEFAULT_SENTINEL)
    }
}
