//! zkmirror - Mirror a ZooKeeper namespace to and from a directory tree.
//!
//! Usage:
//!   zkmirror export [--zpath /] [--dest_dir zdata]   ZooKeeper -> files
//!   zkmirror import [--zpath /] [--src_dir zdata]    files -> ZooKeeper
//!   zkmirror --verbose ...                           Print each znode
//!   zkmirror --help                                  Show help

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

use zkmirror_client::ZkClient;
use zkmirror_core::{
    ConnectConfig, DEFAULT_ADDRESS, DEFAULT_MIRROR_DIR, DEFAULT_SENTINEL, ExportConfig,
    ExportReport, ImportConfig, ImportReport, Session, ZnodePath,
};
use zkmirror_ops::{export_tree, import_tree};

#[derive(Parser)]
#[command(
    name = "zkmirror",
    version,
    about = "Simple ZooKeeper import/export tool",
    long_about = "zkmirror mirrors a ZooKeeper namespace to a directory tree and back.\n\n\
                  Every znode becomes a directory; a non-empty payload is stored in a \
                  file named by --zdata inside that directory."
)]
struct Cli {
    /// Enables verbose mode (prints each znode as it is processed)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export ZooKeeper data to a directory
    Export {
        #[command(flatten)]
        common: CommonArgs,

        /// Destination directory
        #[arg(long = "dest_dir", visible_alias = "dest-dir", default_value = DEFAULT_MIRROR_DIR)]
        dest_dir: PathBuf,
    },

    /// Import ZooKeeper data from a directory
    Import {
        #[command(flatten)]
        common: CommonArgs,

        /// Source directory
        #[arg(long = "src_dir", visible_alias = "src-dir", default_value = DEFAULT_MIRROR_DIR)]
        src_dir: PathBuf,

        /// Descend into symlinked directories
        #[arg(long)]
        follow_symlinks: bool,

        /// Fail instead of creating missing parent znodes
        #[arg(long)]
        no_create_parents: bool,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// ZooKeeper path
    #[arg(long, default_value = "/")]
    zpath: ZnodePath,

    /// ZooKeeper address
    #[arg(long, default_value = DEFAULT_ADDRESS)]
    zaddress: String,

    /// ZooKeeper data file name
    #[arg(long, default_value = DEFAULT_SENTINEL)]
    zdata: String,

    /// Session timeout (e.g. "500ms", "10s", "1m")
    #[arg(long, default_value = "10s", value_parser = parse_timeout)]
    timeout: Duration,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Export { common, dest_dir } => {
            run_export(&common, dest_dir)?;
        }
        Command::Import {
            common,
            src_dir,
            follow_symlinks,
            no_create_parents,
        } => {
            run_import(&common, src_dir, follow_symlinks, !no_create_parents)?;
        }
    }

    Ok(())
}

/// Log to stderr; `RUST_LOG` overrides the level picked by `--verbose`.
fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "info,zkmirror=debug,zkmirror_core=debug,zkmirror_scan=debug,zkmirror_ops=debug,zkmirror_client=debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Open a session; it is closed when dropped on any error path.
fn connect(common: &CommonArgs) -> Result<Session<ZkClient>> {
    let config = ConnectConfig::builder()
        .address(common.zaddress.clone())
        .session_timeout(common.timeout)
        .build()
        .wrap_err("Invalid connection options")?;

    let client = ZkClient::connect(&config)
        .wrap_err_with(|| format!("Failed to connect to {}", config.address))?;
    Ok(Session::new(client))
}

/// Export a znode subtree to a directory.
fn run_export(common: &CommonArgs, dest_dir: PathBuf) -> Result<()> {
    let config = ExportConfig::builder()
        .zpath(common.zpath.clone())
        .dest_dir(dest_dir)
        .sentinel(common.zdata.clone())
        .build()
        .wrap_err("Invalid export options")?;

    let session = connect(common)?;
    let report = export_tree(&*session, &config).wrap_err("Export failed")?;
    session
        .close()
        .wrap_err("Failed to close ZooKeeper session")?;

    match common.format {
        OutputFormat::Text => {
            print_export_summary(&report);
            println!("ZooKeeper data exported to {}", config.dest_dir.display());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

/// Import a directory tree into ZooKeeper.
fn run_import(
    common: &CommonArgs,
    src_dir: PathBuf,
    follow_symlinks: bool,
    create_parents: bool,
) -> Result<()> {
    let config = ImportConfig::builder()
        .zpath(common.zpath.clone())
        .src_dir(src_dir)
        .sentinel(common.zdata.clone())
        .follow_symlinks(follow_symlinks)
        .create_parents(create_parents)
        .build()
        .wrap_err("Invalid import options")?;

    let mut session = connect(common)?;
    let report = import_tree(&mut *session, &config).wrap_err("Import failed")?;
    session
        .close()
        .wrap_err("Failed to close ZooKeeper session")?;

    match common.format {
        OutputFormat::Text => {
            print_import_summary(&report);
            println!("ZooKeeper data imported from {}", config.src_dir.display());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn print_export_summary(report: &ExportReport) {
    eprintln!(
        "{} znodes, {} payload files ({}) in {:.2}s",
        report.nodes_visited,
        report.files_written,
        format_size(report.bytes_written),
        report.duration.as_secs_f64()
    );
}

fn print_import_summary(report: &ImportReport) {
    eprintln!(
        "{} payload files: {} updated, {} created, {} parents created ({}) in {:.2}s",
        report.files_found,
        report.nodes_updated,
        report.nodes_created,
        report.parents_created,
        format_size(report.bytes_written),
        report.duration.as_secs_f64()
    );

    if !report.warnings.is_empty() {
        eprintln!("{} warning(s) during import", report.warnings.len());
        for warning in &report.warnings {
            eprintln!("  {}: {}", warning.path.display(), warning.message);
        }
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Parse a timeout string (e.g., "500ms", "10s", "2m"). Bare numbers are seconds.
fn parse_timeout(s: &str) -> Result<Duration, String> {
    let s = s.trim().to_lowercase();
    let invalid = || format!("invalid timeout: {s:?}");

    let (num, unit_secs) = if let Some(n) = s.strip_suffix("ms") {
        (n, 0.001)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1.0)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60.0)
    } else {
        (s.as_str(), 1.0)
    };

    let num: f64 = num.trim().parse().map_err(|_| invalid())?;
    if !num.is_finite() || num <= 0.0 {
        return Err(invalid());
    }
    Duration::try_from_secs_f64(num * unit_secs).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timeout() {
        assert_eq!(parse_timeout("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_timeout("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_timeout("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_timeout("3").unwrap(), Duration::from_secs(3));
        assert!(parse_timeout("0s").is_err());
        assert!(parse_timeout("soon").is_err());
        assert!(parse_timeout("1e20s").is_err());
        assert!(parse_timeout("1e18m").is_err());
    }

    #[test]
    fn test_export_defaults() {
        let cli = Cli::try_parse_from(["zkmirror", "export"]).unwrap();
        assert!(!cli.verbose);
        match cli.command {
            Command::Export { common, dest_dir } => {
                assert!(common.zpath.is_root());
                assert_eq!(common.zaddress, "localhost:2181");
                assert_eq!(common.zdata, "___zdata___");
                assert_eq!(common.timeout, Duration::from_secs(10));
                assert_eq!(common.format, OutputFormat::Text);
                assert_eq!(dest_dir, PathBuf::from("zdata"));
            }
            Command::Import { .. } => panic!("expected export"),
        }
    }

    #[test]
    fn test_import_options() {
        let cli = Cli::try_parse_from([
            "zkmirror",
            "import",
            "--zpath",
            "/restore",
            "--zaddress",
            "zk1:2181,zk2:2181",
            "--src_dir",
            "backup",
            "--zdata",
            "payload",
            "--no-create-parents",
            "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Import {
                common,
                src_dir,
                follow_symlinks,
                no_create_parents,
            } => {
                assert_eq!(common.zpath.as_str(), "/restore");
                assert_eq!(common.zaddress, "zk1:2181,zk2:2181");
                assert_eq!(common.zdata, "payload");
                assert_eq!(src_dir, PathBuf::from("backup"));
                assert!(!follow_symlinks);
                assert!(no_create_parents);
            }
            Command::Export { .. } => panic!("expected import"),
        }
    }

    #[test]
    fn test_invalid_zpath_rejected() {
        assert!(Cli::try_parse_from(["zkmirror", "export", "--zpath", "relative"]).is_err());
        assert!(Cli::try_parse_from(["zkmirror", "export", "--zpath", "//a"]).is_err());
    }

    #[test]
    fn test_oversized_timeout_rejected() {
        assert!(Cli::try_parse_from(["zkmirror", "export", "--timeout", "1e20s"]).is_err());
    }

    #[test]
    fn test_dash_aliases() {
        let cli = Cli::try_parse_from(["zkmirror", "export", "--dest-dir", "out"]).unwrap();
        match cli.command {
            Command::Export { dest_dir, .. } => assert_eq!(dest_dir, PathBuf::from("out")),
            Command::Import { .. } => panic!("expected export"),
        }
    }

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
