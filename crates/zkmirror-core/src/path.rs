//! Znode paths and their mapping onto filesystem paths.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PathError;

/// An absolute, validated znode path such as `/app/config`.
///
/// The root is `/`. Every other path is a `/`-separated list of non-empty
/// segments with no trailing separator, so joining never produces `//`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ZnodePath(String);

impl ZnodePath {
    /// The root znode, `/`.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Parse and validate an absolute znode path.
    ///
    /// A single trailing `/` on a non-root path is accepted and dropped.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if !path.starts_with('/') {
            return Err(PathError::NotAbsolute {
                path: path.to_string(),
            });
        }
        if path == "/" {
            return Ok(Self::root());
        }

        let trimmed = path.strip_suffix('/').unwrap_or(path);
        for segment in trimmed[1..].split('/') {
            check_segment(path, segment)?;
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Whether this is the root znode.
    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path of the named child of this znode.
    pub fn child(&self, name: &str) -> Result<Self, PathError> {
        let joined = if self.is_root() {
            format!("/{name}")
        } else {
            format!("{}/{name}", self.0)
        };
        check_segment(&joined, name)?;
        Ok(Self(joined))
    }

    /// Parent znode, or `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
            None => None,
        }
    }

    /// Proper ancestors below the root, shallowest first.
    ///
    /// `/a/b/c` yields `/a` then `/a/b`.
    pub fn ancestors(&self) -> Vec<Self> {
        let mut ancestors = Vec::new();
        let mut current = self.parent();
        while let Some(parent) = current {
            if parent.is_root() {
                break;
            }
            current = parent.parent();
            ancestors.push(parent);
        }
        ancestors.reverse();
        ancestors
    }

    /// Iterate over the path segments (empty for the root).
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// Last segment, or `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.segments().last()
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.segments().count()
    }

    /// Directory mirroring this znode under `root`.
    ///
    /// The root znode maps to `root` itself.
    pub fn to_fs_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.extend(self.segments());
        path
    }

    /// Append every component of a relative filesystem path.
    ///
    /// An empty relative path returns `self` unchanged.
    pub fn join_relative(&self, relative: &Path) -> Result<Self, PathError> {
        let mut joined = self.clone();
        for component in relative.components() {
            match component {
                Component::Normal(name) => {
                    let name = name.to_str().ok_or_else(|| PathError::NonUtf8 {
                        path: relative.to_path_buf(),
                    })?;
                    joined = joined.child(name)?;
                }
                Component::CurDir => {}
                _ => {
                    return Err(PathError::UnsupportedComponent {
                        path: relative.to_path_buf(),
                    });
                }
            }
        }
        Ok(joined)
    }
}

fn check_segment(path: &str, segment: &str) -> Result<(), PathError> {
    if segment.is_empty() {
        return Err(PathError::EmptySegment {
            path: path.to_string(),
        });
    }
    if segment.contains('/') {
        return Err(PathError::InvalidName {
            name: segment.to_string(),
        });
    }
    if segment == "." || segment == ".." {
        return Err(PathError::ReservedSegment {
            path: path.to_string(),
            segment: segment.to_string(),
        });
    }
    if segment.contains('\0') {
        return Err(PathError::InvalidName {
            name: segment.escape_default().to_string(),
        });
    }
    Ok(())
}

impl Default for ZnodePath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for ZnodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ZnodePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ZnodePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ZnodePath> for String {
    fn from(path: ZnodePath) -> Self {
        path.0
    }
}

impl AsRef<str> for ZnodePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
