//! Audit events emitted for every balance mutation
//!
//! Events are structured values rather than log lines so a reconciliation job
//! can replay them against stored balances.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::balance::{Counter, UserId};
use super::reward::RewardType;

/// Why a counter changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditReason {
    /// Spent by a feature
    Consume,
    /// Granted by a social action or administrative top-up
    Grant,
    /// Returned after a failed downstream action
    Refund,
    /// Part of a kudos-for-credits redemption
    Redemption { reward: RewardType },
}

/// One applied counter change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub user_id: UserId,
    pub counter: Counter,
    /// Signed change that was applied
    pub delta: i64,
    /// Counter value right after the change
    pub resulting_balance: u64,
    pub reason: AuditReason,
    pub timestamp: DateTime<Utc>,
}
