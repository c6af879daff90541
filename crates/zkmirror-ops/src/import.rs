//! Filesystem to ZooKeeper import.

use std::fs;
use std::time::Instant;

use tracing::{debug, info, warn};

use zkmirror_core::{
    ImportConfig, ImportReport, MirrorError, MirrorWarning, SetOutcome, StoreError, ZnodePath,
    ZnodeStore,
};
use zkmirror_scan::{SentinelScan, SentinelScanner};

/// Write every sentinel file under `config.src_dir` into the store.
///
/// `<src_dir>/a/b/<sentinel>` is written to `<zpath>/a/b`. Existing znodes
/// are updated in place; missing ones are created, with missing ancestors
/// created empty first when `config.create_parents` is set. Nothing is
/// deleted and only the data payload is touched.
///
/// Unreadable directories are skipped with a warning. Any other store or
/// I/O error aborts the import.
pub fn import_tree<S>(store: &mut S, config: &ImportConfig) -> Result<ImportReport, MirrorError>
where
    S: ZnodeStore + ?Sized,
{
    let start = Instant::now();

    info!(
        "Importing {} into {}",
        config.src_dir.display(),
        config.zpath
    );

    let scan = SentinelScanner::new(&config.sentinel)
        .follow_symlinks(config.follow_symlinks)
        .scan(&config.src_dir);

    let mut report = import_scan(store, config, scan)?;
    report.duration = start.elapsed();
    Ok(report)
}

/// Write the payload files of an existing scan of `config.src_dir`.
///
/// Scan warnings are carried into the report.
pub fn import_scan<S>(
    store: &mut S,
    config: &ImportConfig,
    scan: SentinelScan,
) -> Result<ImportReport, MirrorError>
where
    S: ZnodeStore + ?Sized,
{
    let start = Instant::now();
    let mut report = ImportReport::new(config.zpath.clone(), &config.src_dir);
    report.files_found = scan.files.len() as u64;
    report.warnings = scan.warnings;

    for file in &scan.files {
        let znode = match config.znode_for(file) {
            Ok(znode) => znode,
            Err(err) => {
                warn!("Skipping {}: {err}", file.display());
                report.warnings.push(MirrorWarning::invalid_name(file, &err));
                continue;
            }
        };

        debug!("Importing {znode}");
        let data = fs::read(file).map_err(|e| MirrorError::io(file, e))?;
        write_znode(store, &znode, &data, config.create_parents, &mut report)?;
        report.bytes_written += data.len() as u64;
    }

    report.duration = start.elapsed();
    info!(
        "Imported {} znodes ({} updated, {} created)",
        report.nodes_written(),
        report.nodes_updated,
        report.nodes_created
    );
    Ok(report)
}

/// Update `znode`, falling back to creating it when it does not exist.
fn write_znode<S>(
    store: &mut S,
    znode: &ZnodePath,
    data: &[u8],
    create_parents: bool,
    report: &mut ImportReport,
) -> Result<(), MirrorError>
where
    S: ZnodeStore + ?Sized,
{
    match store.set_data(znode, data) {
        SetOutcome::Updated => report.nodes_updated += 1,
        SetOutcome::NotFound => {
            if create_parents {
                report.parents_created += create_missing_ancestors(store, znode)?;
            }
            store.create_node(znode, data)?;
            report.nodes_created += 1;
        }
        SetOutcome::Failed(err) => return Err(err.into()),
    }
    Ok(())
}

/// Create every missing ancestor of `znode` with an empty payload.
fn create_missing_ancestors<S>(store: &mut S, znode: &ZnodePath) -> Result<u64, StoreError>
where
    S: ZnodeStore + ?Sized,
{
    let mut created = 0;
    for ancestor in znode.ancestors() {
        if store.exists(&ancestor)? {
            continue;
        }
        match store.create_node(&ancestor, &[]) {
            Ok(()) => {
                debug!("Created parent {ancestor}");
                created += 1;
            }
            Err(StoreError::NodeExists { .. }) => {}
            Err(err) => return Err(err),
        }
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zkmirror_core::MemoryEnsemble;

    fn path(s: &str) -> ZnodePath {
        ZnodePath::parse(s).unwrap()
    }

    #[test]
    fn test_write_znode_updates_existing() {
        let mut ensemble = MemoryEnsemble::new();
        ensemble.insert(&path("/a"), "old");
        let mut report = ImportReport::default();

        write_znode(&mut ensemble, &path("/a"), b"new", true, &mut report).unwrap();

        assert_eq!(report.nodes_updated, 1);
        assert_eq!(report.nodes_created, 0);
        assert_eq!(ensemble.data(&path("/a")), Some(b"new".to_vec()));
        assert_eq!(ensemble.create_count(), 0);
    }

    #[test]
    fn test_write_znode_creates_missing() {
        let mut ensemble = MemoryEnsemble::new();
        let mut report = ImportReport::default();

        write_znode(&mut ensemble, &path("/a"), b"new", false, &mut report).unwrap();

        assert_eq!(report.nodes_created, 1);
        assert_eq!(ensemble.data(&path("/a")), Some(b"new".to_vec()));
    }

    #[test]
    fn test_create_missing_ancestors() {
        let mut ensemble = MemoryEnsemble::new();
        ensemble.insert(&path("/a"), "kept");

        let created = create_missing_ancestors(&mut ensemble, &path("/a/b/c/d")).unwrap();

        assert_eq!(created, 2);
        assert_eq!(ensemble.data(&path("/a")), Some(b"kept".to_vec()));
        assert_eq!(ensemble.data(&path("/a/b")), Some(Vec::new()));
        assert_eq!(ensemble.data(&path("/a/b/c")), Some(Vec::new()));
        assert_eq!(ensemble.data(&path("/a/b/c/d")), None);
    }

    #[test]
    fn test_missing_parent_without_create_parents() {
        let mut ensemble = MemoryEnsemble::new();
        let mut report = ImportReport::default();

        let err = write_znode(&mut ensemble, &path("/a/b"), b"x", false, &mut report).unwrap_err();

        assert!(matches!(err, MirrorError::Store(StoreError::NoNode { .. })));
        assert_eq!(report.nodes_created, 0);
    }
}
