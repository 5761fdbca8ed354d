//! Kudos Economy Library
//! # Overview
//!
//! This library implements a per-user economy: consumable credits, social
//! kudos, subscription tiers and a reward exchange that turns kudos into
//! credits.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (balances, subscriptions, rewards, errors)
//! - [`cli`] - Sweeper CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::credit_ledger`] - Atomic consume/add over credit counters
//!   - [`core::kudos_ledger`] - Atomic consume/add over kudos counters
//!   - [`core::subscription`] - Subscription lifecycle mutations
//!   - [`core::redemption`] - Kudos-for-credits exchange
//!   - [`core::sweep`] - Periodic subscription expiration
//!   - [`core::store`] - Balance store implementations
//!
//! # Currencies
//!
//! - **Credits**: consumable allowances (voice, blueprint, group, analytics,
//!   naturalLanguage), spent one unit per use
//! - **Kudos**: earned from peers (encouragements, congratulations), spent
//!   only on rewards
//!
//! # Guarantees
//!
//! - Balances never go negative; every debit is a conditional update in the
//!   store, never read-then-write
//! - A redemption debits kudos and grants credits in one atomic update
//! - Every store call is bounded by a deadline and fails `Unavailable` on
//!   timeout

pub mod cli;
pub mod core;
pub mod types;

pub use core::{
    Authorization, BalanceStore, CreditLedger, Economy, EngineConfig, EntitlementGate,
    ExpirationSweep, KudosLedger, MemoryAuditSink, MemoryStore, Redemption, RedemptionEngine,
    SubscriptionService, SweepConfig, SweepReport, TracingAuditSink,
};
pub use types::{
    CreditKind, EconomyError, KudosKind, RewardType, Subscription, SubscriptionFeatures,
    SubscriptionStatus, Tier, UserBalanceRecord, UserId,
};
