//! Summaries of completed mirroring runs.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use crate::error::MirrorWarning;
use crate::path::ZnodePath;

/// Outcome of a finished export.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    /// Znode the export started from.
    pub zpath: ZnodePath,
    /// Local mirror root.
    pub dest_dir: PathBuf,
    /// Znodes visited.
    pub nodes_visited: u64,
    /// Directories that did not exist before the run.
    pub directories_created: u64,
    /// Payload files written.
    pub files_written: u64,
    /// Total payload bytes written.
    pub bytes_written: u64,
    /// Wall time of the run.
    pub duration: Duration,
}

impl ExportReport {
    /// Create an empty report for a run.
    pub fn new(zpath: ZnodePath, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            zpath,
            dest_dir: dest_dir.into(),
            ..Default::default()
        }
    }

    /// Record a visited znode.
    pub fn record_node(&mut self, created_dir: bool) {
        self.nodes_visited += 1;
        if created_dir {
            self.directories_created += 1;
        }
    }

    /// Record a written payload file.
    pub fn record_file(&mut self, size: u64) {
        self.files_written += 1;
        self.bytes_written += size;
    }
}

/// Outcome of a finished import.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    /// Znode the source tree was mapped onto.
    pub zpath: ZnodePath,
    /// Local source root.
    pub src_dir: PathBuf,
    /// Payload files discovered.
    pub files_found: u64,
    /// Existing znodes whose data was overwritten.
    pub nodes_updated: u64,
    /// Znodes created from payload files.
    pub nodes_created: u64,
    /// Empty ancestors created so a payload node could be created.
    pub parents_created: u64,
    /// Total payload bytes written.
    pub bytes_written: u64,
    /// Recoverable problems hit along the way.
    pub warnings: Vec<MirrorWarning>,
    /// Wall time of the run.
    pub duration: Duration,
}

impl ImportReport {
    /// Create an empty report for a run.
    pub fn new(zpath: ZnodePath, src_dir: impl Into<PathBuf>) -> Self {
        Self {
            zpath,
            src_dir: src_dir.into(),
            ..Default::default()
        }
    }

    /// Znodes written from payload files, updated or created.
    pub fn nodes_written(&self) -> u64 {
        self.nodes_updated + self.nodes_created
    }
}
