//! Core traits for balance persistence and audit output
//!
//! These are the seams where the engine meets its environment. Every
//! component receives its store and audit sink at construction, so the engine
//! runs unchanged against the in-memory store in tests and a document database
//! in production.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::types::{
    AuditEvent, Balances, Counter, CounterUpdate, EconomyError, Subscription, UserBalanceRecord,
    UserId,
};

/// Result of a conditional counter update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Every guard held; carries the balances right after the update
    Applied(Balances),
    /// A guard failed and nothing was written
    ///
    /// `balances` is what the store observed for the report; it is not an
    /// authoritative read.
    Rejected { counter: Counter, balances: Balances },
}

/// Persistence contract for per-user balance records
///
/// One record per user, holding the `credits`, `kudos` and `subscription`
/// sub-fields. Implementations must provide two primitives:
///
/// - `apply` runs as one atomic conditional update on a single record
///   (find-and-update with `value >= amount` filters plus increments). Two
///   concurrent callers can never both pass a guard that only one of them
///   can satisfy.
/// - `expire_subscriptions` is a bulk update across records; it need not be
///   transactional across users.
///
/// There is no in-process locking above this trait.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Persist a new record; fails `AlreadyExists` if the user has one
    async fn insert(&self, record: UserBalanceRecord) -> Result<(), EconomyError>;

    /// Read a record; fails `NotFound` if the user has none
    async fn load(&self, user: &UserId) -> Result<UserBalanceRecord, EconomyError>;

    /// Atomically apply a conditional counter update to one record
    ///
    /// Fails `NotFound` when the user has no record. A failed guard is not an
    /// error: it is reported as [`UpdateOutcome::Rejected`].
    async fn apply(
        &self,
        user: &UserId,
        update: &CounterUpdate,
    ) -> Result<UpdateOutcome, EconomyError>;

    /// Overwrite the whole subscription sub-record (last write wins)
    async fn replace_subscription(
        &self,
        user: &UserId,
        subscription: Subscription,
    ) -> Result<(), EconomyError>;

    /// Downgrade every live subscription whose end date is at or before `now`
    ///
    /// Matching subscriptions become `{tier: free, status: expired,
    /// endDate: now}`. Returns how many records changed.
    async fn expire_subscriptions(&self, now: DateTime<Utc>) -> Result<u64, EconomyError>;
}

/// Receiver for balance mutation audit events
///
/// Called after the store confirmed the mutation. Implementations must not
/// block on I/O.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}
