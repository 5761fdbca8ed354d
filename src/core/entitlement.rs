//! Entitlement gate: subscription check in front of credit consumption
//!
//! Premium subscribers spend nothing for kinds their feature set marks
//! unlimited. Everyone else pays one credit per use.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::credit_ledger::CreditLedger;
use super::ledger::Ledger;
use crate::types::{CreditKind, EconomyError, UserId};

/// How a gated action was paid for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    /// Covered by the subscription; no balance was touched
    Unlimited,
    /// One credit was consumed; `remaining` is the balance afterwards
    Consumed { remaining: u64 },
}

#[derive(Debug, Clone)]
pub struct EntitlementGate {
    ledger: Ledger,
    credits: CreditLedger,
}

impl EntitlementGate {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            credits: CreditLedger::new(ledger.clone()),
            ledger,
        }
    }

    /// Authorize one use of `kind` for `user` at `now`
    ///
    /// The subscription read and the consume are separate store calls. A
    /// subscription that lapses in between still lets this use through as
    /// unlimited.
    pub async fn authorize(
        &self,
        user: &UserId,
        kind: CreditKind,
        now: DateTime<Utc>,
    ) -> Result<Authorization, EconomyError> {
        let record = self.ledger.load(user).await?;
        if record.subscription.features(now).is_unlimited(kind) {
            debug!(user_id = %user, kind = %kind, "Use covered by subscription");
            return Ok(Authorization::Unlimited);
        }

        let remaining = self.credits.consume_one(user, kind).await?;
        Ok(Authorization::Consumed { remaining })
    }
}
