#![allow(clippy::collapsible_if)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]

// Core modules
pub mod analysis;
pub mod config;
pub mod domain;
pub mod engine;
pub mod models;
pub mod report;
pub mod utils;

// Re-export commonly used types outside of crate (for the CLI and integration tests)
pub use config::{ANALYSIS, AnalysisConfig};
pub use engine::{SetupEngine, SnapshotOptions, build_market_snapshot, build_market_snapshot_with, build_snapshots};
pub use models::{MarketSnapshot, PriceSeries, RawBar, SnapshotError};
pub use report::narrate;

// CLI argument parsing
use {clap::Parser, std::path::PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON files holding an array of daily bars (one asset per file, named after the file stem)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// JSON file overriding the default analysis configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Benchmark series correlated against the asset (repeatable)
    #[arg(long = "benchmark")]
    pub benchmarks: Vec<PathBuf>,

    /// Emit snapshots as JSON instead of the text report
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
