//! Kudos ledger: social currency earned from peers, spent on rewards

use tracing::debug;

use super::ledger::{validate_amount, Ledger};
use crate::types::{AuditReason, CounterUpdate, Counters, EconomyError, KudosKind, UserId};

/// Typed view of the [`Ledger`] over kudos counters
///
/// Same contract as [`CreditLedger`](super::credit_ledger::CreditLedger), with
/// no multiplier and no refund path.
#[derive(Debug, Clone)]
pub struct KudosLedger {
    ledger: Ledger,
}

impl KudosLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Spend `amount` kudos of `kind`, refusing if the balance is short
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - the balance after the decrement
    /// * `Err(EconomyError::InsufficientFunds)` - the balance was short
    pub async fn consume(
        &self,
        user: &UserId,
        kind: KudosKind,
        amount: u64,
    ) -> Result<u64, EconomyError> {
        let amount = validate_amount(amount)?;
        let update = CounterUpdate::new().debit(kind, amount);
        let balances = self.ledger.apply(user, &update, AuditReason::Consume).await?;
        let remaining = balances.kudos.get(kind);
        debug!(user_id = %user, kind = %kind, amount, remaining, "Consumed kudos");
        Ok(remaining)
    }

    /// Award `amount` kudos of `kind`; social actions typically award 1
    pub async fn add(
        &self,
        user: &UserId,
        kind: KudosKind,
        amount: u64,
    ) -> Result<u64, EconomyError> {
        let amount = validate_amount(amount)?;
        let update = CounterUpdate::new().credit(kind, amount);
        let balances = self.ledger.apply(user, &update, AuditReason::Grant).await?;
        let balance = balances.kudos.get(kind);
        debug!(user_id = %user, kind = %kind, amount, balance, "Awarded kudos");
        Ok(balance)
    }

    pub async fn get_all(&self, user: &UserId) -> Result<Counters<KudosKind>, EconomyError> {
        Ok(self.ledger.load(user).await?.kudos)
    }
}
