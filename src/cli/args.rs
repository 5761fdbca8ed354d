use crate::core::SweepConfig;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Expire lapsed subscriptions in a balance snapshot
#[derive(Parser, Debug)]
#[command(name = "economy-sweeper")]
#[command(about = "Expire lapsed subscriptions in a balance snapshot", long_about = None)]
pub struct CliArgs {
    /// JSON snapshot of user balance records, rewritten after each sweep
    #[arg(
        long = "snapshot",
        value_name = "PATH",
        env = "ECONOMY_SNAPSHOT",
        help = "Path to the JSON balance snapshot"
    )]
    pub snapshot: PathBuf,

    /// Seconds between sweeps
    #[arg(
        long = "interval-secs",
        value_name = "SECS",
        env = "ECONOMY_SWEEP_INTERVAL_SECS",
        help = "Seconds between sweeps (default: 86400)"
    )]
    pub interval_secs: Option<u64>,

    /// Deadline for each store call
    #[arg(
        long = "store-deadline-secs",
        value_name = "SECS",
        env = "ECONOMY_STORE_DEADLINE_SECS",
        help = "Deadline for each store call in seconds (default: 30)"
    )]
    pub store_deadline_secs: Option<u64>,

    /// Sweep once and exit
    #[arg(long = "once", help = "Run a single sweep and exit")]
    pub once: bool,

    /// Emit logs as JSON lines
    #[arg(long = "log-json", env = "ECONOMY_LOG_JSON", help = "Emit logs as JSON")]
    pub log_json: bool,

    /// Tokio worker threads
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Runtime worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,
}

impl CliArgs {
    /// Build the sweep settings, falling back to defaults for missing values
    pub fn to_sweep_config(&self) -> SweepConfig {
        let default = SweepConfig::default();
        SweepConfig::new(
            self.interval_secs
                .map_or(default.interval, Duration::from_secs),
            self.store_deadline_secs
                .map_or(default.deadline, Duration::from_secs),
        )
    }

    /// Worker threads for the runtime; zero falls back to the CPU count
    pub fn worker_threads(&self) -> usize {
        match self.workers {
            Some(count) if count > 0 => count,
            _ => num_cpus::get(),
        }
    }
}
