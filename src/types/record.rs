//! The per-user balance record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::balance::{Balances, Counters, CreditKind, KudosKind, UserId};
use super::subscription::Subscription;

/// Everything the economy engine owns for one user
///
/// Embedded in the user document and owned exclusively by it. Credits and
/// kudos change only through ledger operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBalanceRecord {
    pub user_id: UserId,
    #[serde(default)]
    pub credits: Counters<CreditKind>,
    #[serde(default)]
    pub kudos: Counters<KudosKind>,
    pub subscription: Subscription,
}

impl UserBalanceRecord {
    /// Starter record for a freshly registered user
    ///
    /// Starter credits per kind, no kudos, free tier active from `now`.
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            credits: Counters::from_fn(|kind: CreditKind| kind.starter_balance()),
            kudos: Counters::zeroed(),
            subscription: Subscription::free(now),
        }
    }

    pub fn balances(&self) -> Balances {
        Balances {
            credits: self.credits.clone(),
            kudos: self.kudos.clone(),
        }
    }

    pub fn set_balances(&mut self, balances: Balances) {
        self.credits = balances.credits;
        self.kudos = balances.kudos;
    }
}
