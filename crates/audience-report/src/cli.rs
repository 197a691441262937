use clap::Parser;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Hourly audience reporting from broadcast ratings exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "audience-report",
    about = "Hourly audience reporting from broadcast ratings exports",
    version
)]
pub struct Settings {
    /// Ratings files or directories to ingest
    #[arg(value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// Program-schedule file to merge into the results
    #[arg(long)]
    pub schedule: Option<PathBuf>,

    /// Fallback year for schedule date tokens (defaults to the current year)
    #[arg(long)]
    pub year: Option<i32>,

    /// Combine all ingested periods into one aggregate
    #[arg(long)]
    pub combine: bool,

    /// Store directory (defaults to ~/.audience-report/store)
    #[arg(long)]
    pub store_dir: Option<PathBuf>,

    /// Persist the results to the store after processing
    #[arg(long)]
    pub save: bool,

    /// Show previously stored results instead of ingesting
    #[arg(long)]
    pub load: bool,

    /// Remove all stored results and exit
    #[arg(long)]
    pub clear_store: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,
}

// ── Tests ──────────────────────────────────────────────────────────────────────
