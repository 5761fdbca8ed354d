//! One-stop construction of every economy component
//!
//! All components share the same store, audit sink and configuration, so a
//! caller wires the economy once and hands out the pieces it needs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::config::{EngineConfig, SweepConfig};
use super::credit_ledger::CreditLedger;
use super::entitlement::EntitlementGate;
use super::kudos_ledger::KudosLedger;
use super::ledger::Ledger;
use super::redemption::RedemptionEngine;
use super::store::within_deadline;
use super::subscription::SubscriptionService;
use super::sweep::ExpirationSweep;
use super::traits::{AuditSink, BalanceStore};
use crate::types::{EconomyError, UserBalanceRecord, UserId};

/// The user economy: ledgers, subscriptions, redemptions and the sweep
#[derive(Debug, Clone)]
pub struct Economy {
    pub credits: CreditLedger,
    pub kudos: KudosLedger,
    pub subscriptions: SubscriptionService,
    pub redemptions: RedemptionEngine,
    pub entitlements: EntitlementGate,
    pub sweep: ExpirationSweep,
    ledger: Ledger,
}

impl Economy {
    pub fn new(
        store: Arc<dyn BalanceStore>,
        audit: Arc<dyn AuditSink>,
        engine: EngineConfig,
        sweep: SweepConfig,
    ) -> Self {
        let ledger = Ledger::new(Arc::clone(&store), audit, engine);
        Self {
            credits: CreditLedger::new(ledger.clone()),
            kudos: KudosLedger::new(ledger.clone()),
            subscriptions: SubscriptionService::new(Arc::clone(&store), engine),
            redemptions: RedemptionEngine::new(ledger.clone()),
            entitlements: EntitlementGate::new(ledger.clone()),
            sweep: ExpirationSweep::new(store, sweep),
            ledger,
        }
    }

    /// Create the starter record for a new user
    ///
    /// Fails `AlreadyExists` if the user already has one.
    pub async fn open_account(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<UserBalanceRecord, EconomyError> {
        let record = UserBalanceRecord::new(user.clone(), now);
        within_deadline(
            self.ledger.config().store_deadline,
            "insert",
            self.ledger.store().insert(record.clone()),
        )
        .await?;
        info!(user_id = %user, "Opened economy account");
        Ok(record)
    }

    /// The user's whole record: credits, kudos and subscription
    pub async fn account(&self, user: &UserId) -> Result<UserBalanceRecord, EconomyError> {
        self.ledger.load(user).await
    }
}
