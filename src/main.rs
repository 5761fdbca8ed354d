//! Economy Sweeper CLI
//!
//! Hosts the subscription expiration sweep over a JSON snapshot of user
//! balance records.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --snapshot users.json --once
//! cargo run -- --snapshot users.json --interval-secs 3600
//! RUST_LOG=debug cargo run -- --snapshot users.json --log-json
//! ```
//!
//! The snapshot is loaded into the in-memory store, swept, and written back
//! after every sweep. Without `--once` the sweep repeats on the interval until
//! Ctrl-C.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (snapshot unreadable or unwritable, runtime failure, etc.)

use std::future::Future;
use std::process;
use std::sync::Arc;

use chrono::Utc;
use kudos_economy::cli::{self, CliArgs};
use kudos_economy::{EconomyError, ExpirationSweep, MemoryStore};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = cli::parse_args();
    init_tracing(args.log_json);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(args.worker_threads())
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to start runtime");
            process::exit(1);
        }
    };

    if let Err(e) = runtime.block_on(run(args)) {
        error!(error = %e, "Sweeper failed");
        process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(args: CliArgs) -> Result<(), EconomyError> {
    let store = Arc::new(MemoryStore::load_snapshot(&args.snapshot)?);
    let sweep = ExpirationSweep::new(store.clone(), args.to_sweep_config());

    if args.once {
        let report = sweep.run_once(Utc::now()).await?;
        store.write_snapshot(&args.snapshot)?;
        info!(expired = report.expired, "Sweep complete");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_shutdown(tokio::signal::ctrl_c(), cancel.clone()));

    sweep
        .run_until_cancelled(cancel, |report| {
            if let Err(e) = store.write_snapshot(&args.snapshot) {
                error!(error = %e, expired = report.expired, "Failed to write snapshot");
            }
        })
        .await;

    Ok(())
}

/// Cancel `token` once `signal` resolves
///
/// A signal listener that fails also cancels, so the sweep loop can always
/// be stopped.
async fn cancel_on_shutdown<F>(signal: F, token: CancellationToken)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => error!(error = %e, "Failed to listen for Ctrl-C, stopping sweep"),
    }
    token.cancel();
}
