//! Types module
//!
//! Contains the data structures shared by every economy component:
//! - `balance`: user ids, credit/kudos kinds, counters and conditional updates
//! - `subscription`: tier/status state and derived entitlements
//! - `reward`: redeemable rewards and their terms
//! - `record`: the per-user balance record
//! - `audit`: structured audit events
//! - `error`: error types for the economy engine

pub mod audit;
pub mod balance;
pub mod error;
pub mod record;
pub mod reward;
pub mod subscription;

pub use audit::{AuditEvent, AuditReason};
pub use balance::{
    Balances, Counter, CounterDelta, CounterKind, CounterUpdate, Counters, CreditKind, Currency,
    KudosKind, UpdateFailure, UserId,
};
pub use error::EconomyError;
pub use record::UserBalanceRecord;
pub use reward::{RewardTerms, RewardType};
pub use subscription::{
    Subscription, SubscriptionFeatures, SubscriptionStatus, Tier, UNLIMITED_MULTIPLIER,
};
