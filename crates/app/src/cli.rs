//! Command-line flags for the runner.
//!
//! ```text
//! ambulance-feed [--agent] [--ticks N] [--json] [--seed N]
//!                [--config PATH] [--fleet PATH]
//! ```

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "ambulance-feed")]
#[command(about = "Simulated real-time ambulance tracking feed")]
#[command(version)]
pub struct RunOptions {
    /// Drive the feed over JSON lines on stdin/stdout instead of real time
    #[arg(long)]
    pub agent: bool,

    /// Exit after this many fixed ticks
    #[arg(long, value_name = "N")]
    pub ticks: Option<u64>,

    /// Print each snapshot as one JSON line on stdout
    #[arg(long)]
    pub json: bool,

    /// Seed for the wander RNG (OS entropy when absent)
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Feed config JSON file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Fleet seed list JSON file
    #[arg(long, value_name = "PATH")]
    pub fleet: Option<PathBuf>,
}
