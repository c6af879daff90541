//! Error and warning types for mirroring operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path::ZnodePath;

/// Why a string or filesystem path is not a valid znode path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Znode paths must start with `/`.
    #[error("Znode path must be absolute: {path:?}")]
    NotAbsolute { path: String },

    /// Path contains `//` or is otherwise missing a segment.
    #[error("Znode path has an empty segment: {path}")]
    EmptySegment { path: String },

    /// `.` and `..` are not valid znode names.
    #[error("Znode path {path} contains reserved segment {segment:?}")]
    ReservedSegment { path: String, segment: String },

    /// A child name contains a separator or NUL byte.
    #[error("Invalid znode name: {name:?}")]
    InvalidName { name: String },

    /// Filesystem path is not valid UTF-8.
    #[error("Path is not valid UTF-8: {}", path.display())]
    NonUtf8 { path: PathBuf },

    /// Filesystem path has a root, prefix, or `..` component.
    #[error("Path cannot be mapped to a znode: {}", path.display())]
    UnsupportedComponent { path: PathBuf },

    /// File does not live under the mirror root.
    #[error("{} is not inside {}", path.display(), root.display())]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// File is not a payload file.
    #[error("{} is not named {sentinel:?}", path.display())]
    NotSentinel { path: PathBuf, sentinel: String },
}

/// Errors reported by a [`ZnodeStore`](crate::ZnodeStore).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The ensemble is unreachable or the session was lost.
    #[error("ZooKeeper connection failed: {message}")]
    Connection { message: String },

    /// The znode does not exist.
    #[error("No such znode: {path}")]
    NoNode { path: ZnodePath },

    /// The znode already exists.
    #[error("Znode already exists: {path}")]
    NodeExists { path: ZnodePath },

    /// The store was used after being closed.
    #[error("Session already closed")]
    Closed,

    /// Any other server-side failure.
    #[error("ZooKeeper error at {path}: {message}")]
    Other { path: ZnodePath, message: String },
}

impl StoreError {
    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Whether this error means the znode is absent.
    pub fn is_no_node(&self) -> bool {
        matches!(self, Self::NoNode { .. })
    }
}

/// Errors that abort an export or import.
#[derive(Debug, Error)]
pub enum MirrorError {
    /// ZooKeeper call failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A path could not be mapped between the two trees.
    #[error(transparent)]
    InvalidPath(#[from] PathError),

    /// Local filesystem failure.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MirrorError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Kind of mirror warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// Permission was denied.
    PermissionDenied,
    /// Error reading a directory.
    ReadError,
    /// A payload file whose location cannot be turned into a znode path.
    InvalidName,
}

/// Non-fatal problem recorded while mirroring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl MirrorWarning {
    /// Create a new warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a warning for a directory that could not be scanned.
    pub fn scan_failed(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        let kind = match error.kind() {
            std::io::ErrorKind::PermissionDenied => WarningKind::PermissionDenied,
            _ => WarningKind::ReadError,
        };
        Self::new(path, format!("Error while scanning: {error}"), kind)
    }

    /// Create a warning for a payload file that maps to no valid znode.
    pub fn invalid_name(path: impl Into<PathBuf>, error: &PathError) -> Self {
        Self::new(path, error.to_string(), WarningKind::InvalidName)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_error_sources() {
        let errors = [
            MirrorError::from(StoreError::Closed),
            MirrorError::from(PathError::NotAbsolute {
                path: "a".to_string(),
            }),
            MirrorError::io("/tmp/x", std::io::Error::other("boom")),
        ];
        for err in &errors {
            match err {
                MirrorError::Store(_) | MirrorError::InvalidPath(_) | MirrorError::Io { .. } => {}
            }
        }
        assert!(errors[2].to_string().contains("/tmp/x"));
    }

    #[test]
    fn test_scan_failed_kind() {
        let warning = MirrorWarning::scan_failed(
            "/test/path",
            &std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(warning.kind, WarningKind::PermissionDenied);
        assert!(warning.message.contains("denied"));

        let warning = MirrorWarning::scan_failed(
            "/test/path",
            &std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(warning.kind, WarningKind::ReadError);
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::NoNode {
            path: ZnodePath::parse("/a/b").unwrap(),
        };
        assert!(err.is_no_node());
        assert_eq!(err.to_string(), "No such znode: /a/b");
    }

    #[test]
    fn test_mirror_error_from_store() {
        let err: MirrorError = StoreError::connection("refused").into();
        assert!(matches!(err, MirrorError::Store(StoreError::Connection { .. })));
        assert!(err.to_string().contains("refused"));
    }
}
