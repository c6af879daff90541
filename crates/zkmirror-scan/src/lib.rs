//! Payload file discovery for zkmirror.
//!
//! An import starts by finding every sentinel file below the source
//! directory. Directories are walked with an explicit stack; a directory
//! that cannot be read is recorded as a warning and its subtree skipped.
//!
//! # Example
//!
//! ```rust,no_run
//! use zkmirror_scan::SentinelScanner;
//!
//! let scan = SentinelScanner::new("___zdata___").scan("zdata".as_ref());
//!
//! for file in &scan.files {
//!     println!("{}", file.display());
//! }
//! println!("{} warning(s)", scan.warnings.len());
//! ```

mod scanner;
mod visited;

pub use scanner::{SentinelScan, SentinelScanner};
pub use visited::{DirId, VisitedDirs};

// Re-export core types for convenience
pub use zkmirror_core::{MirrorWarning, WarningKind};
