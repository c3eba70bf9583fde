//! Command-line interface definitions for NewsFlow.
//!
//! Every option is optional: a bare `newsflow` performs the standard run
//! against the built-in target and storage path.

use clap::Parser;

/// Command-line arguments for a single ingestion run.
///
/// # Examples
///
/// ```sh
/// # Standard run
/// newsflow
///
/// # Different database, four records in flight
/// newsflow --db-path /tmp/news.db --concurrency 4
///
/// # Settings from a file, then show what was stored
/// newsflow --config newsflow.yaml --show 5
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listing page to ingest
    #[arg(short, long, env = "NEWSFLOW_URL")]
    pub url: Option<String>,

    /// SQLite database file
    #[arg(short, long, env = "NEWSFLOW_DB_PATH")]
    pub db_path: Option<String>,

    /// Fetch timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Number of records processed concurrently
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Print the N most recently stored articles after the run
    #[arg(long, value_name = "N")]
    pub show: Option<usize>,

    /// Also print the summary as a JSON line
    #[arg(long)]
    pub json: bool,
}
