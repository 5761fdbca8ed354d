//! Subscription mutations and reads
//!
//! Every mutation writes the whole subscription sub-record. Concurrent
//! writers (billing webhooks, the expiration sweep) resolve by last write
//! wins; there is no version check.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::config::EngineConfig;
use super::store::within_deadline;
use super::traits::BalanceStore;
use crate::types::{EconomyError, Subscription, SubscriptionFeatures, Tier, UserId};

/// Upgrade, cancel, renew and downgrade a user's subscription
#[derive(Clone)]
pub struct SubscriptionService {
    store: Arc<dyn BalanceStore>,
    config: EngineConfig,
}

impl std::fmt::Debug for SubscriptionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SubscriptionService {
    pub fn new(store: Arc<dyn BalanceStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// The stored subscription sub-record
    pub async fn get(&self, user: &UserId) -> Result<Subscription, EconomyError> {
        let record = within_deadline(self.config.store_deadline, "load", self.store.load(user))
            .await?;
        Ok(record.subscription)
    }

    /// Feature set the user is entitled to at `now`
    pub async fn features(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<SubscriptionFeatures, EconomyError> {
        Ok(self.get(user).await?.features(now))
    }

    /// Start a paid period on `tier`
    ///
    /// A full overwrite: any pending cancellation and end date are dropped.
    pub async fn upgrade(
        &self,
        user: &UserId,
        tier: Tier,
        provider: Option<String>,
        external_subscription_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Subscription, EconomyError> {
        let subscription = Subscription::upgraded(tier, provider, external_subscription_id, now);
        self.replace(user, subscription.clone()).await?;
        info!(user_id = %user, tier = ?tier, "Upgraded subscription");
        Ok(subscription)
    }

    /// Cancel at `now`; entitlements continue until the end date
    pub async fn cancel(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Subscription, EconomyError> {
        let mut subscription = self.get(user).await?;
        subscription.cancel(now);
        self.replace(user, subscription.clone()).await?;
        info!(
            user_id = %user,
            tier = ?subscription.tier,
            end_date = ?subscription.end_date,
            "Canceled subscription"
        );
        Ok(subscription)
    }

    /// Start the next billing period and clear any cancellation
    pub async fn renew(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Subscription, EconomyError> {
        let mut subscription = self.get(user).await?;
        subscription.renew(now);
        self.replace(user, subscription.clone()).await?;
        info!(
            user_id = %user,
            tier = ?subscription.tier,
            renewal_date = ?subscription.renewal_date,
            "Renewed subscription"
        );
        Ok(subscription)
    }

    /// Reset the user to the default free subscription starting at `now`
    pub async fn downgrade(
        &self,
        user: &UserId,
        now: DateTime<Utc>,
    ) -> Result<Subscription, EconomyError> {
        let subscription = Subscription::free(now);
        self.replace(user, subscription.clone()).await?;
        info!(user_id = %user, "Downgraded subscription to free");
        Ok(subscription)
    }

    async fn replace(&self, user: &UserId, subscription: Subscription) -> Result<(), EconomyError> {
        within_deadline(
            self.config.store_deadline,
            "replace_subscription",
            self.store.replace_subscription(user, subscription),
        )
        .await
    }
}
