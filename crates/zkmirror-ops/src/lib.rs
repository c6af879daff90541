//! Export and import procedures for zkmirror.
//!
//! Both directions are plain depth-first walks over an explicit stack and
//! work against any [`ZnodeStore`]: a live ensemble in the binary, a
//! [`MemoryEnsemble`] in tests.
//!
//! Path mapping: znode `/a/b/c` mirrors to directory `<dest_dir>/a/b/c`,
//! and its payload, when non-empty, to `<dest_dir>/a/b/c/<sentinel>`. On
//! import, `<src_dir>/a/b/c/<sentinel>` is written to `<zpath>/a/b/c`.

mod export;
mod import;

pub use export::export_tree;
pub use import::{import_scan, import_tree};

// Re-export core types for convenience
pub use zkmirror_core::{
    ExportConfig, ExportReport, ImportConfig, ImportReport, MemoryEnsemble, MirrorError,
    MirrorWarning, ZnodePath, ZnodeStore,
};
