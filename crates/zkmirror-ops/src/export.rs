//! ZooKeeper to filesystem export.

use std::fs;
use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use zkmirror_core::{ExportConfig, ExportReport, MirrorError, ZnodeStore};

/// Mirror the subtree at `config.zpath` under `config.dest_dir`.
///
/// Every visited znode gets a directory; znodes with a non-empty payload
/// also get a sentinel file holding the raw bytes. Existing directories are
/// reused and existing payload files overwritten; nothing is deleted.
///
/// The walk uses an explicit stack. The first store or I/O error aborts the
/// export, leaving whatever was already written in place.
pub fn export_tree<S>(store: &S, config: &ExportConfig) -> Result<ExportReport, MirrorError>
where
    S: ZnodeStore + ?Sized,
{
    let start = Instant::now();
    let mut report = ExportReport::new(config.zpath.clone(), &config.dest_dir);

    info!(
        "Exporting {} to {}",
        config.zpath,
        config.dest_dir.display()
    );

    let mut stack = vec![config.zpath.clone()];
    while let Some(path) = stack.pop() {
        for name in store.list_children(&path)? {
            stack.push(path.child(&name)?);
        }

        debug!("Dumping {path}");
        let (data, stat) = store.get_data(&path)?;

        let dir = config.mirror_dir(&path);
        let created = ensure_dir(&dir)?;
        report.record_node(created);

        if stat.has_data() {
            let file = dir.join(&config.sentinel);
            fs::write(&file, &data).map_err(|e| MirrorError::io(&file, e))?;
            report.record_file(data.len() as u64);
        }
    }

    report.duration = start.elapsed();
    info!(
        "Exported {} znodes ({} payload files)",
        report.nodes_visited, report.files_written
    );
    Ok(report)
}

/// Create `dir` and its parents. Returns `true` if it did not exist.
fn ensure_dir(dir: &Path) -> Result<bool, MirrorError> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir).map_err(|e| MirrorError::io(dir, e))?;
    Ok(true)
}
