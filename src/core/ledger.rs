//! Shared execution path for every counter mutation
//!
//! `Ledger` is the one place that talks to the store on behalf of the credit
//! ledger, the kudos ledger and the redemption engine. It bounds each store
//! call by the configured deadline, turns a rejected guard into
//! `InsufficientFunds` with required/available context, and emits one audit
//! event per applied delta.
//!
//! # Architecture
//!
//! ```text
//! Ledger (cloneable)
//!     ├── Arc<dyn BalanceStore>  (atomic conditional updates)
//!     ├── Arc<dyn AuditSink>     (structured audit trail)
//!     └── EngineConfig           (store deadline)
//! ```

use std::sync::Arc;

use chrono::Utc;

use super::config::EngineConfig;
use super::store::within_deadline;
use super::traits::{AuditSink, BalanceStore, UpdateOutcome};
use crate::types::{
    AuditEvent, AuditReason, Balances, CounterUpdate, EconomyError, UserBalanceRecord, UserId,
};

/// Cloneable handle over the store, audit sink and engine settings
#[derive(Clone)]
pub struct Ledger {
    store: Arc<dyn BalanceStore>,
    audit: Arc<dyn AuditSink>,
    config: EngineConfig,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Ledger {
    pub fn new(
        store: Arc<dyn BalanceStore>,
        audit: Arc<dyn AuditSink>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            audit,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn BalanceStore> {
        &self.store
    }

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Read the user's whole record
    pub async fn load(&self, user: &UserId) -> Result<UserBalanceRecord, EconomyError> {
        within_deadline(self.config.store_deadline, "load", self.store.load(user)).await
    }

    /// Apply `update` as one atomic store call and audit every delta
    ///
    /// # Returns
    ///
    /// * `Ok(Balances)` - balances right after the update
    /// * `Err(EconomyError::InsufficientFunds)` - a debit guard failed; nothing
    ///   was written
    /// * `Err(EconomyError::NotFound)` - the user has no record
    /// * `Err(EconomyError::Unavailable)` - the store missed the deadline
    pub async fn apply(
        &self,
        user: &UserId,
        update: &CounterUpdate,
        reason: AuditReason,
    ) -> Result<Balances, EconomyError> {
        let outcome = within_deadline(
            self.config.store_deadline,
            "apply",
            self.store.apply(user, update),
        )
        .await?;

        match outcome {
            UpdateOutcome::Applied(balances) => {
                let timestamp = Utc::now();
                for delta in update.deltas() {
                    self.audit.record(AuditEvent {
                        user_id: user.clone(),
                        counter: delta.counter,
                        delta: delta.delta,
                        resulting_balance: balances.get(delta.counter),
                        reason,
                        timestamp,
                    });
                }
                Ok(balances)
            }
            UpdateOutcome::Rejected { counter, balances } => Err(EconomyError::insufficient_funds(
                user,
                counter,
                update.required(counter),
                balances.get(counter),
            )),
        }
    }
}

/// Check an amount before it reaches the store
///
/// Amounts must be positive and fit the store's signed counters.
pub(crate) fn validate_amount(amount: u64) -> Result<i64, EconomyError> {
    if amount == 0 {
        return Err(EconomyError::invalid_argument("amount must be positive"));
    }
    i64::try_from(amount)
        .map_err(|_| EconomyError::invalid_argument(format!("amount {amount} is too large")))
}
