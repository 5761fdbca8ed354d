//! Core business logic module
//!
//! This module contains the economy components:
//! - `traits` - Store and audit seams
//! - `store` - Balance store implementations
//! - `ledger` - Shared conditional-update path with deadlines and auditing
//! - `credit_ledger` / `kudos_ledger` - Typed consume/add over each currency
//! - `subscription` - Upgrade, cancel, renew and downgrade
//! - `redemption` - Atomic kudos-for-credits exchange
//! - `entitlement` - Subscription check in front of credit consumption
//! - `sweep` - Periodic subscription expiration
//! - `economy` - Wires all of the above from one store

pub mod audit;
pub mod config;
pub mod credit_ledger;
pub mod economy;
pub mod entitlement;
pub mod kudos_ledger;
pub mod ledger;
pub mod redemption;
pub mod store;
pub mod subscription;
pub mod sweep;
pub mod traits;

pub use audit::{MemoryAuditSink, TracingAuditSink};
pub use config::{EngineConfig, SweepConfig};
pub use credit_ledger::CreditLedger;
pub use economy::Economy;
pub use entitlement::{Authorization, EntitlementGate};
pub use kudos_ledger::KudosLedger;
pub use ledger::Ledger;
pub use redemption::{Redemption, RedemptionEngine};
pub use store::MemoryStore;
pub use subscription::SubscriptionService;
pub use sweep::{ExpirationSweep, SweepReport};
pub use traits::{AuditSink, BalanceStore, UpdateOutcome};
