use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use std::path::{Path, PathBuf};

/// Fleetwatch: single-board device fleet monitor
///
/// Fleetwatch polls a fleet of devices, classifies each as offline,
/// reachable, or running, and keeps a durable per-day ledger of the time
/// spent in each state for dashboards and BI exports.
#[derive(Debug, Parser, Clone)]
#[command(about, long_about, version)]
pub(crate) struct Cli {
    /// Path to configuration file.
    #[arg(short, long, value_parser = validate_file)]
    pub(crate) conffile: Option<PathBuf>,

    /// File to load and save ledger state to.
    ///
    /// Overrides the configuration's persistence.state_path.
    #[arg(short, long)]
    pub(crate) statefile: Option<PathBuf>,

    /// Render the daily report as CSV on stdout and exit.
    #[arg(long)]
    pub(crate) export_csv: bool,

    /// Print the effective configuration as TOML and exit.
    #[arg(long)]
    pub(crate) dump_config: bool,

    #[command(flatten)]
    pub(crate) verbosity: Verbosity<WarnLevel>,
}

/// Check if the file exists.
#[inline(always)]
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = Path::new(file);
    if path.exists() {
        Ok(path.to_owned())
    } else {
        Err(format!("File not found: {:?}", path))
    }
}
