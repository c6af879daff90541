//! Core types and traits for zkmirror.
//!
//! This crate provides the pieces shared by the exporter, the importer and
//! the ZooKeeper client: znode paths and their filesystem mapping,
//! configuration, errors, the [`ZnodeStore`] connector trait and an
//! in-memory store.

mod config;
mod error;
mod memory;
mod path;
mod report;
mod session;
mod store;

pub use config::{
    ConnectConfig, ConnectConfigBuilder, DEFAULT_ADDRESS, DEFAULT_MIRROR_DIR, DEFAULT_SENTINEL,
    DEFAULT_SESSION_TIMEOUT, ExportConfig, ExportConfigBuilder, ImportConfig, ImportConfigBuilder,
    validate_sentinel,
};
pub use error::{MirrorError, MirrorWarning, PathError, StoreError, WarningKind};
pub use memory::MemoryEnsemble;
pub use path::ZnodePath;
pub use report::{ExportReport, ImportReport};
pub use session::Session;
pub use store::{NodeStat, SetOutcome, ZnodeStore};
