//! Periodic subscription expiration
//!
//! Once per interval, every live subscription whose end date has passed is
//! downgraded to `{tier: free, status: expired}` in one bulk store call. A
//! second run at the same instant finds nothing left to change.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::config::SweepConfig;
use super::store::within_deadline;
use super::traits::BalanceStore;
use crate::types::EconomyError;

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Subscriptions downgraded by this run
    pub expired: u64,
    pub ran_at: DateTime<Utc>,
}

/// Expiration sweep over a [`BalanceStore`]
#[derive(Clone)]
pub struct ExpirationSweep {
    store: Arc<dyn BalanceStore>,
    config: SweepConfig,
}

impl std::fmt::Debug for ExpirationSweep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExpirationSweep")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ExpirationSweep {
    pub fn new(store: Arc<dyn BalanceStore>, config: SweepConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> SweepConfig {
        self.config
    }

    /// Expire everything due at `now`
    pub async fn run_once(&self, now: DateTime<Utc>) -> Result<SweepReport, EconomyError> {
        let expired = within_deadline(
            self.config.deadline,
            "expire_subscriptions",
            self.store.expire_subscriptions(now),
        )
        .await?;

        if expired > 0 {
            info!(expired, ran_at = %now, "Expired subscriptions");
        } else {
            debug!(ran_at = %now, "No subscriptions due for expiry");
        }
        Ok(SweepReport {
            expired,
            ran_at: now,
        })
    }

    /// Sweep immediately, then every `interval`, until `cancel` fires
    ///
    /// A failed sweep is logged and the loop waits for the next tick.
    /// `after_sweep` sees each successful report.
    pub async fn run_until_cancelled<F>(&self, cancel: CancellationToken, mut after_sweep: F)
    where
        F: FnMut(&SweepReport),
    {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval = ?self.config.interval, "Expiration sweep started");
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    match self.run_once(Utc::now()).await {
                        Ok(report) => after_sweep(&report),
                        Err(err) => error!(error = %err, "Expiration sweep failed"),
                    }
                }
            }
        }
        info!("Expiration sweep stopped");
    }
}
