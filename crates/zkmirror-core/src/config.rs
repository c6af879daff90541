//! Connection and mirroring configuration types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::PathError;
use crate::path::ZnodePath;

/// Default ensemble connection string.
pub const DEFAULT_ADDRESS: &str = "localhost:2181";

/// Default local mirror directory.
pub const DEFAULT_MIRROR_DIR: &str = "zdata";

/// Default name of the per-directory payload file.
pub const DEFAULT_SENTINEL: &str = "___zdata___";

/// Default ZooKeeper session timeout.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(10);

/// How to reach the ensemble.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ConnectConfig {
    /// Connection string, `host:port[,host:port...]`.
    #[builder(default = "DEFAULT_ADDRESS.to_string()")]
    pub address: String,

    /// Session timeout negotiated with the ensemble.
    #[builder(default = "DEFAULT_SESSION_TIMEOUT")]
    #[serde(default = "default_session_timeout")]
    pub session_timeout: Duration,
}

fn default_session_timeout() -> Duration {
    DEFAULT_SESSION_TIMEOUT
}

fn default_true() -> bool {
    true
}

impl ConnectConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref address) = self.address {
            if address.trim().is_empty() {
                return Err("ZooKeeper address cannot be empty".to_string());
            }
        }
        if self.session_timeout == Some(Duration::ZERO) {
            return Err("Session timeout must be positive".to_string());
        }
        Ok(())
    }
}

impl ConnectConfig {
    /// Create a new connect config builder.
    pub fn builder() -> ConnectConfigBuilder {
        ConnectConfigBuilder::default()
    }

    /// Config for an address with the default timeout.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            session_timeout: DEFAULT_SESSION_TIMEOUT,
        }
    }
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ADDRESS)
    }
}

/// What to export and where.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ExportConfig {
    /// Znode the export starts from.
    #[builder(default)]
    #[serde(default)]
    pub zpath: ZnodePath,

    /// Local directory the namespace is mirrored under.
    #[builder(default = "PathBuf::from(DEFAULT_MIRROR_DIR)")]
    pub dest_dir: PathBuf,

    /// Name of the payload file written in each mirrored directory.
    #[builder(default = "DEFAULT_SENTINEL.to_string()")]
    pub sentinel: String,
}

impl ExportConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref dest_dir) = self.dest_dir {
            if dest_dir.as_os_str().is_empty() {
                return Err("Destination directory cannot be empty".to_string());
            }
        }
        match self.sentinel {
            Some(ref sentinel) => validate_sentinel(sentinel),
            None => Ok(()),
        }
    }
}

impl ExportConfig {
    /// Create a new export config builder.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder::default()
    }

    /// Export `zpath` under `dest_dir` with the default sentinel name.
    pub fn new(zpath: ZnodePath, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            zpath,
            dest_dir: dest_dir.into(),
            sentinel: DEFAULT_SENTINEL.to_string(),
        }
    }

    /// Directory mirroring `znode`.
    pub fn mirror_dir(&self, znode: &ZnodePath) -> PathBuf {
        znode.to_fs_path(&self.dest_dir)
    }

    /// Payload file for `znode`.
    pub fn sentinel_path(&self, znode: &ZnodePath) -> PathBuf {
        self.mirror_dir(znode).join(&self.sentinel)
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::new(ZnodePath::root(), DEFAULT_MIRROR_DIR)
    }
}

/// What to import and where.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ImportConfig {
    /// Znode the source tree is mapped onto.
    #[builder(default)]
    #[serde(default)]
    pub zpath: ZnodePath,

    /// Local directory to read payload files from.
    #[builder(default = "PathBuf::from(DEFAULT_MIRROR_DIR)")]
    pub src_dir: PathBuf,

    /// Name of the payload file in each directory.
    #[builder(default = "DEFAULT_SENTINEL.to_string()")]
    pub sentinel: String,

    /// Descend into symlinked directories.
    #[builder(default = "false")]
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Create missing ancestors (with no data) before creating a node.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub create_parents: bool,
}

impl ImportConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref src_dir) = self.src_dir {
            if src_dir.as_os_str().is_empty() {
                return Err("Source directory cannot be empty".to_string());
            }
        }
        match self.sentinel {
            Some(ref sentinel) => validate_sentinel(sentinel),
            None => Ok(()),
        }
    }
}

impl ImportConfig {
    /// Create a new import config builder.
    pub fn builder() -> ImportConfigBuilder {
        ImportConfigBuilder::default()
    }

    /// Import `src_dir` onto `zpath` with default options.
    pub fn new(zpath: ZnodePath, src_dir: impl Into<PathBuf>) -> Self {
        Self {
            zpath,
            src_dir: src_dir.into(),
            sentinel: DEFAULT_SENTINEL.to_string(),
            follow_symlinks: false,
            create_parents: true,
        }
    }

    /// Znode a payload file found under `src_dir` belongs to.
    ///
    /// `<src_dir>/a/b/<sentinel>` maps to `<zpath>/a/b`, and a payload file
    /// directly in `src_dir` maps to `zpath` itself.
    pub fn znode_for(&self, sentinel_file: &Path) -> Result<ZnodePath, PathError> {
        let relative =
            sentinel_file
                .strip_prefix(&self.src_dir)
                .map_err(|_| PathError::OutsideRoot {
                    path: sentinel_file.to_path_buf(),
                    root: self.src_dir.clone(),
                })?;

        if relative.file_name().and_then(|n| n.to_str()) != Some(self.sentinel.as_str()) {
            return Err(PathError::NotSentinel {
                path: sentinel_file.to_path_buf(),
                sentinel: self.sentinel.clone(),
            });
        }

        let dir = relative.parent().unwrap_or(Path::new(""));
        self.zpath.join_relative(dir)
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self::new(ZnodePath::root(), DEFAULT_MIRROR_DIR)
    }
}

/// Check that a sentinel name is a single plain file name.
pub fn validate_sentinel(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Sentinel file name cannot be empty".to_string());
    }
    if name.contains('/') || name.contains(std::path::MAIN_SEPARATOR) {
        return Err(format!("Sentinel file name cannot contain a separator: {name:?}"));
    }
    if name == "." || name == ".." {
        return Err(format!("Sentinel file name cannot be {name:?}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_builder_defaults() {
        let config = ConnectConfig::builder().build().unwrap();
        assert_eq!(config.address, DEFAULT_ADDRESS);
        assert_eq!(config.session_timeout, DEFAULT_SESSION_TIMEOUT);

        assert!(ConnectConfig::builder().address("  ").build().is_err());
        assert!(ConnectConfig::builder()
            .session_timeout(Duration::ZERO)
            .build()
            .is_err());
    }

    #[test]
    fn test_export_builder() {
        let config = ExportConfig::builder()
            .zpath(ZnodePath::parse("/app").unwrap())
            .dest_dir("/tmp/mirror")
            .build()
            .unwrap();

        assert_eq!(config.zpath.as_str(), "/app");
        assert_eq!(config.dest_dir, PathBuf::from("/tmp/mirror"));
        assert_eq!(config.sentinel, DEFAULT_SENTINEL);
    }

    #[test]
    fn test_export_builder_rejects_bad_sentinel() {
        assert!(ExportConfig::builder().sentinel("a/b").build().is_err());
        assert!(ExportConfig::builder().sentinel("").build().is_err());
        assert!(ExportConfig::builder().sentinel("..").build().is_err());
    }

    #[test]
    fn test_sentinel_path() {
        let config = ExportConfig::new(ZnodePath::root(), "zdata");
        let znode = ZnodePath::parse("/a/b/c").unwrap();

        assert_eq!(
            config.sentinel_path(&znode),
            Path::new("zdata/a/b/c").join(DEFAULT_SENTINEL)
        );
        assert_eq!(
            config.sentinel_path(&ZnodePath::root()),
            Path::new("zdata").join(DEFAULT_SENTINEL)
        );
    }

    #[test]
    fn test_import_defaults() {
        let config = ImportConfig::builder().build().unwrap();
        assert!(config.zpath.is_root());
        assert!(config.create_parents);
        assert!(!config.follow_symlinks);
        assert_eq!(config.src_dir, PathBuf::from(DEFAULT_MIRROR_DIR));
    }

    #[test]
    fn test_znode_for() {
        let config = ImportConfig::new(ZnodePath::root(), "zdata");
        let file = Path::new("zdata/a/b/c").join(DEFAULT_SENTINEL);
        assert_eq!(config.znode_for(&file).unwrap().as_str(), "/a/b/c");

        let at_root = Path::new("zdata").join(DEFAULT_SENTINEL);
        assert!(config.znode_for(&at_root).unwrap().is_root());

        let nested = ImportConfig::new(ZnodePath::parse("/svc").unwrap(), "zdata");
        assert_eq!(nested.znode_for(&file).unwrap().as_str(), "/svc/a/b/c");
        assert_eq!(nested.znode_for(&at_root).unwrap().as_str(), "/svc");
    }

    #[test]
    fn test_znode_for_rejects_foreign_paths() {
        let config = ImportConfig::new(ZnodePath::root(), "zdata");

        assert!(matches!(
            config.znode_for(Path::new("other/___zdata___")),
            Err(PathError::OutsideRoot { .. })
        ));
        assert!(matches!(
            config.znode_for(Path::new("zdata/a/notes.txt")),
            Err(PathError::NotSentinel { .. })
        ));
    }

    #[test]
    fn test_config_serde_defaults() {
        let config: ImportConfig =
            serde_json::from_str(r#"{"src_dir": "dump", "sentinel": "___zdata___"}"#).unwrap();
        assert!(config.zpath.is_root());
        assert!(config.create_parents);

        let config: ExportConfig = serde_json::from_str(
            r#"{"zpath": "/a", "dest_dir": "dump", "sentinel": "___zdata___"}"#,
        )
        .unwrap();
        assert_eq!(config.zpath.as_str(), "/a");
        assert!(serde_json::from_str::<ExportConfig>(
            r#"{"zpath": "a//b", "dest_dir": "dump", "sentinel": "x"}"#
        )
        .is_err());
    }
}
