//! Reward redemption: exchange kudos for credits
//!
//! The kudos debit and the credit payout go to the store as ONE conditional
//! update on the user's record (guard: kudos >= cost). Either both land or
//! neither does; there is no state in which kudos are spent but the credits
//! were never granted.

use serde::Serialize;
use tracing::{debug, info};

use super::ledger::{validate_amount, Ledger};
use crate::types::{
    AuditReason, CounterUpdate, CreditKind, EconomyError, KudosKind, RewardType, UserId,
};

/// Receipt for a completed redemption
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub reward: RewardType,
    pub kudos_kind: KudosKind,
    pub kudos_spent: u64,
    /// Balance of `kudos_kind` right after the redemption
    pub kudos_remaining: u64,
    pub credit_kind: Option<CreditKind>,
    pub credits_received: u64,
    pub message: String,
}

/// Converts kudos into credits according to each reward's terms
#[derive(Debug, Clone)]
pub struct RedemptionEngine {
    ledger: Ledger,
}

impl RedemptionEngine {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Redeem `reward` by spending kudos of `kudos_kind`
    ///
    /// # Returns
    ///
    /// * `Ok(Redemption)` - kudos were spent and the payout granted
    /// * `Err(EconomyError::NotYetAvailable)` - the reward is disabled; the
    ///   store was not touched
    /// * `Err(EconomyError::InsufficientFunds)` - too few kudos; nothing changed
    pub async fn redeem(
        &self,
        user: &UserId,
        reward: RewardType,
        kudos_kind: KudosKind,
    ) -> Result<Redemption, EconomyError> {
        let terms = reward.terms();
        if !terms.available {
            debug!(user_id = %user, reward = %reward, "Reward not yet available");
            return Err(EconomyError::not_yet_available(reward));
        }

        let mut update = CounterUpdate::new().debit(kudos_kind, validate_amount(terms.kudos_cost)?);
        if let Some((kind, amount)) = terms.payout {
            update = update.credit(kind, validate_amount(amount)?);
        }

        let balances = self
            .ledger
            .apply(user, &update, AuditReason::Redemption { reward })
            .await
            .inspect_err(|err| {
                if err.is_business_outcome() {
                    debug!(user_id = %user, reward = %reward, "Redemption refused: {}", err);
                }
            })?;

        let redemption = Redemption {
            reward,
            kudos_kind,
            kudos_spent: terms.kudos_cost,
            kudos_remaining: balances.kudos.get(kudos_kind),
            credit_kind: terms.payout.map(|(kind, _)| kind),
            credits_received: terms.payout.map_or(0, |(_, amount)| amount),
            message: format!("Successfully redeemed {reward} reward using {kudos_kind}"),
        };

        info!(
            user_id = %user,
            reward = %reward,
            kudos_kind = %kudos_kind,
            kudos_remaining = redemption.kudos_remaining,
            credits_received = redemption.credits_received,
            "Redeemed reward"
        );
        Ok(redemption)
    }

    /// Parse caller-supplied names, then [`redeem`](Self::redeem)
    ///
    /// The reward name is validated before the kudos kind, and both before
    /// any store access.
    pub async fn redeem_str(
        &self,
        user: &UserId,
        reward: &str,
        kudos_kind: &str,
    ) -> Result<Redemption, EconomyError> {
        let reward: RewardType = reward.parse()?;
        let kudos_kind: KudosKind = kudos_kind.parse()?;
        self.redeem(user, reward, kudos_kind).await
    }
}
