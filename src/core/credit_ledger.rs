//! Credit ledger: atomic consume/add/check over the `credits` counters
//!
//! The authoritative gate for spending is [`CreditLedger::consume`], whose
//! guard runs inside the store's atomic conditional update. [`CreditLedger::check`]
//! is advisory only: a positive answer can be stale by the time the caller
//! acts on it.

use std::future::Future;

use tracing::{debug, error, info};

use super::ledger::{validate_amount, Ledger};
use crate::types::{AuditReason, CounterUpdate, Counters, CreditKind, EconomyError, UserId};

/// Typed view of the [`Ledger`] over credit counters
#[derive(Debug, Clone)]
pub struct CreditLedger {
    ledger: Ledger,
}

impl CreditLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Spend `amount` credits of `kind`
    ///
    /// Succeeds only if the balance before the decrement is at least `amount`.
    /// Two concurrent callers can never both spend the last credit.
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - the balance after the decrement
    /// * `Err(EconomyError::InvalidArgument)` - `amount` is zero
    /// * `Err(EconomyError::InsufficientFunds)` - the balance was short
    /// * `Err(EconomyError::NotFound)` - the user has no record
    pub async fn consume(
        &self,
        user: &UserId,
        kind: CreditKind,
        amount: u64,
    ) -> Result<u64, EconomyError> {
        let amount = validate_amount(amount)?;
        let update = CounterUpdate::new().debit(kind, amount);

        match self.ledger.apply(user, &update, AuditReason::Consume).await {
            Ok(balances) => {
                let remaining = balances.credits.get(kind);
                debug!(user_id = %user, kind = %kind, amount, remaining, "Consumed credits");
                Ok(remaining)
            }
            Err(err) => {
                if err.is_business_outcome() {
                    debug!(user_id = %user, kind = %kind, amount, "Credit consumption refused: {}", err);
                }
                Err(err)
            }
        }
    }

    /// Spend a single credit of `kind`
    pub async fn consume_one(&self, user: &UserId, kind: CreditKind) -> Result<u64, EconomyError> {
        self.consume(user, kind, 1).await
    }

    /// Grant `amount` credits of `kind`
    ///
    /// Increments commute, so concurrent adds and consumes need no extra
    /// coordination.
    pub async fn add(
        &self,
        user: &UserId,
        kind: CreditKind,
        amount: u64,
    ) -> Result<u64, EconomyError> {
        self.increment(user, kind, amount, AuditReason::Grant).await
    }

    /// Give back credits consumed for an action that then failed
    pub async fn refund(
        &self,
        user: &UserId,
        kind: CreditKind,
        amount: u64,
    ) -> Result<u64, EconomyError> {
        self.increment(user, kind, amount, AuditReason::Refund).await
    }

    async fn increment(
        &self,
        user: &UserId,
        kind: CreditKind,
        amount: u64,
        reason: AuditReason,
    ) -> Result<u64, EconomyError> {
        let amount = validate_amount(amount)?;
        let update = CounterUpdate::new().credit(kind, amount);
        let balances = self.ledger.apply(user, &update, reason).await?;
        let balance = balances.credits.get(kind);
        debug!(user_id = %user, kind = %kind, amount, balance, reason = ?reason, "Added credits");
        Ok(balance)
    }

    /// Whether the user currently holds at least one credit of `kind`
    ///
    /// For pre-flight UI hints only; never a guarantee that `consume` will
    /// succeed.
    pub async fn check(&self, user: &UserId, kind: CreditKind) -> Result<bool, EconomyError> {
        let record = self.ledger.load(user).await?;
        Ok(record.credits.get(kind) > 0)
    }

    /// The full credits mapping, for display
    pub async fn get_all(&self, user: &UserId) -> Result<Counters<CreditKind>, EconomyError> {
        Ok(self.ledger.load(user).await?.credits)
    }

    /// Spend one credit, run `action`, and refund the credit if it fails
    ///
    /// A refund that itself fails is logged and swallowed; the action's error
    /// is what the caller sees.
    pub async fn spend_with_refund<T, E, F, Fut>(
        &self,
        user: &UserId,
        kind: CreditKind,
        action: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<EconomyError>,
    {
        self.consume_one(user, kind).await?;

        match action().await {
            Ok(value) => Ok(value),
            Err(err) => {
                match self.refund(user, kind, 1).await {
                    Ok(balance) => {
                        info!(user_id = %user, kind = %kind, balance, "Refunded credit after failed action")
                    }
                    Err(refund_err) => error!(
                        user_id = %user,
                        kind = %kind,
                        error = %refund_err,
                        "Failed to refund credit after failed action"
                    ),
                }
                Err(err)
            }
        }
    }
}
