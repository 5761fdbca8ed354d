//! Subscription state and the entitlement facts derived from it
//!
//! Everything here is pure: each derivation takes the subscription value and
//! an explicit `now`, never the wall clock.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use super::balance::CreditKind;

/// Subscription level, ordered by entitlement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Basic,
    Premium,
    Lifetime,
}

impl Tier {
    pub const ALL: [Tier; 4] = [Tier::Free, Tier::Basic, Tier::Premium, Tier::Lifetime];

    /// Feature set granted by the tier while the subscription is active
    pub fn features(self) -> SubscriptionFeatures {
        match self {
            Tier::Free => SubscriptionFeatures::default(),
            Tier::Basic => SubscriptionFeatures {
                no_ads: true,
                credit_multiplier: 2.0,
                ..SubscriptionFeatures::default()
            },
            Tier::Premium | Tier::Lifetime => SubscriptionFeatures {
                unlimited_voice: true,
                unlimited_natural_language: true,
                unlimited_groups: true,
                unlimited_analytics: true,
                no_ads: true,
                priority_support: true,
                credit_multiplier: UNLIMITED_MULTIPLIER,
            },
        }
    }
}

/// Lifecycle state of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Trial,
    Canceled,
    Expired,
}

impl SubscriptionStatus {
    pub const ALL: [SubscriptionStatus; 4] = [
        SubscriptionStatus::Active,
        SubscriptionStatus::Trial,
        SubscriptionStatus::Canceled,
        SubscriptionStatus::Expired,
    ];

    /// Statuses that still grant entitlements (subject to the end date)
    pub fn is_live(self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::Trial | SubscriptionStatus::Canceled
        )
    }
}

/// Multiplier sentinel meaning "unlimited", not a literal factor
pub const UNLIMITED_MULTIPLIER: f64 = 0.0;

/// Fixed-shape feature flags derived from a subscription
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionFeatures {
    pub unlimited_voice: bool,
    pub unlimited_natural_language: bool,
    pub unlimited_groups: bool,
    pub unlimited_analytics: bool,
    pub no_ads: bool,
    pub priority_support: bool,
    pub credit_multiplier: f64,
}

impl Default for SubscriptionFeatures {
    fn default() -> Self {
        Self {
            unlimited_voice: false,
            unlimited_natural_language: false,
            unlimited_groups: false,
            unlimited_analytics: false,
            no_ads: false,
            priority_support: false,
            credit_multiplier: 1.0,
        }
    }
}

impl SubscriptionFeatures {
    /// Whether spending `kind` is waived by these features
    ///
    /// Blueprint credits have no unlimited flag and are always metered.
    pub fn is_unlimited(&self, kind: CreditKind) -> bool {
        match kind {
            CreditKind::Voice => self.unlimited_voice,
            CreditKind::NaturalLanguage => self.unlimited_natural_language,
            CreditKind::Group => self.unlimited_groups,
            CreditKind::Analytics => self.unlimited_analytics,
            CreditKind::Blueprint => false,
        }
    }
}

/// A user's subscription sub-record (1:1 with the balance record)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub tier: Tier,
    pub status: SubscriptionStatus,
    pub start_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canceled_at: Option<DateTime<Utc>>,
    /// Opaque billing linkage, written but never interpreted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_subscription_id: Option<String>,
}

impl Subscription {
    /// Default subscription for a new account: free tier, active from `now`
    pub fn free(now: DateTime<Utc>) -> Self {
        Self {
            tier: Tier::Free,
            status: SubscriptionStatus::Active,
            start_date: now,
            renewal_date: None,
            end_date: None,
            canceled_at: None,
            provider: None,
            external_subscription_id: None,
        }
    }

    /// Fresh paid period starting at `now`
    ///
    /// Monthly tiers renew one calendar month out; lifetime never renews.
    pub fn upgraded(
        tier: Tier,
        provider: Option<String>,
        external_subscription_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            tier,
            status: SubscriptionStatus::Active,
            start_date: now,
            renewal_date: next_renewal(tier, now),
            end_date: None,
            canceled_at: None,
            provider,
            external_subscription_id,
        }
    }

    /// Active, trial and canceled subscriptions count until their end date
    ///
    /// Cancellation is lame-duck: a canceled subscription keeps its
    /// entitlements until `end_date` passes.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        if !self.status.is_live() {
            return false;
        }
        match self.end_date {
            Some(end) => now <= end,
            None => true,
        }
    }

    pub fn is_premium_tier(&self) -> bool {
        matches!(self.tier, Tier::Premium | Tier::Lifetime)
    }

    pub fn has_unlimited_credits(&self, now: DateTime<Utc>) -> bool {
        self.is_active(now) && self.is_premium_tier()
    }

    /// 1.0 when inactive; Basic 2.0, Premium/Lifetime 0.0 (unlimited), Free 1.0
    pub fn credit_multiplier(&self, now: DateTime<Utc>) -> f64 {
        self.features(now).credit_multiplier
    }

    pub fn features(&self, now: DateTime<Utc>) -> SubscriptionFeatures {
        if !self.is_active(now) {
            return SubscriptionFeatures::default();
        }
        self.tier.features()
    }

    /// Mark canceled at `now`, keeping entitlements until the period ends
    ///
    /// An end date already in place is kept, so canceling twice never pushes
    /// the end further out.
    pub fn cancel(&mut self, now: DateTime<Utc>) {
        self.status = SubscriptionStatus::Canceled;
        self.canceled_at = Some(now);
        if self.end_date.is_none() {
            self.end_date = self.renewal_date;
        }
    }

    /// Start another billing period at `now`
    pub fn renew(&mut self, now: DateTime<Utc>) {
        self.status = SubscriptionStatus::Active;
        self.canceled_at = None;
        self.end_date = None;
        if self.tier != Tier::Lifetime {
            self.renewal_date = next_renewal(self.tier, now);
        }
    }

    /// Whether the expiration sweep should downgrade this subscription
    pub fn is_due_for_expiry(&self, now: DateTime<Utc>) -> bool {
        self.status.is_live() && self.end_date.is_some_and(|end| end <= now)
    }

    /// Downgrade to the free tier, as the expiration sweep does
    pub fn expire(&mut self, now: DateTime<Utc>) {
        self.tier = Tier::Free;
        self.status = SubscriptionStatus::Expired;
        self.end_date = Some(now);
    }
}

fn next_renewal(tier: Tier, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if tier == Tier::Lifetime {
        return None;
    }
    now.checked_add_months(Months::new(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rstest::rstest;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap()
    }

    fn subscription(tier: Tier, status: SubscriptionStatus, end: Option<u32>) -> Subscription {
        Subscription {
            tier,
            status,
            start_date: at(1),
            renewal_date: Some(at(1) + Duration::days(31)),
            end_date: end.map(at),
            canceled_at: None,
            provider: None,
            external_subscription_id: None,
        }
    }

    #[rstest]
    #[case::active(SubscriptionStatus::Active, None, true)]
    #[case::trial(SubscriptionStatus::Trial, None, true)]
    #[case::canceled_before_end(SubscriptionStatus::Canceled, Some(20), true)]
    #[case::canceled_after_end(SubscriptionStatus::Canceled, Some(5), false)]
    #[case::active_after_end(SubscriptionStatus::Active, Some(5), false)]
    #[case::expired(SubscriptionStatus::Expired, None, false)]
    #[case::expired_with_future_end(SubscriptionStatus::Expired, Some(20), false)]
    fn test_is_active(
        #[case] status: SubscriptionStatus,
        #[case] end: Option<u32>,
        #[case] expected: bool,
    ) {
        let sub = subscription(Tier::Basic, status, end);
        assert_eq!(sub.is_active(at(10)), expected);
    }

    #[test]
    fn test_is_active_at_exact_end_date() {
        let sub = subscription(Tier::Basic, SubscriptionStatus::Canceled, Some(10));
        assert!(sub.is_active(at(10)));
        assert!(!sub.is_active(at(10) + Duration::seconds(1)));
    }

    #[rstest]
    #[case(Tier::Free, false)]
    #[case(Tier::Basic, false)]
    #[case(Tier::Premium, true)]
    #[case(Tier::Lifetime, true)]
    fn test_is_premium_tier(#[case] tier: Tier, #[case] expected: bool) {
        assert_eq!(subscription(tier, SubscriptionStatus::Active, None).is_premium_tier(), expected);
    }

    /// Every tier x status x end-date combination against the multiplier table
    #[rstest]
    fn test_credit_multiplier_table(
        #[values(Tier::Free, Tier::Basic, Tier::Premium, Tier::Lifetime)] tier: Tier,
        #[values(
            SubscriptionStatus::Active,
            SubscriptionStatus::Trial,
            SubscriptionStatus::Canceled,
            SubscriptionStatus::Expired
        )]
        status: SubscriptionStatus,
        #[values(None, Some(5), Some(20))] end: Option<u32>,
    ) {
        let sub = subscription(tier, status, end);
        let now = at(10);
        let active = status != SubscriptionStatus::Expired && end.map_or(true, |d| d >= 10);

        let expected = match (active, tier) {
            (false, _) => 1.0,
            (true, Tier::Free) => 1.0,
            (true, Tier::Basic) => 2.0,
            (true, Tier::Premium | Tier::Lifetime) => 0.0,
        };

        assert_eq!(sub.is_active(now), active);
        assert_eq!(sub.credit_multiplier(now), expected);
        assert_eq!(sub.features(now).credit_multiplier, expected);
    }

    #[rstest]
    #[case::free(Tier::Free, SubscriptionFeatures::default())]
    #[case::basic(Tier::Basic, SubscriptionFeatures { no_ads: true, credit_multiplier: 2.0, ..Default::default() })]
    #[case::premium(Tier::Premium, SubscriptionFeatures {
        unlimited_voice: true,
        unlimited_natural_language: true,
        unlimited_groups: true,
        unlimited_analytics: true,
        no_ads: true,
        priority_support: true,
        credit_multiplier: 0.0,
    })]
    fn test_features_by_tier(#[case] tier: Tier, #[case] expected: SubscriptionFeatures) {
        let sub = subscription(tier, SubscriptionStatus::Active, None);
        assert_eq!(sub.features(at(10)), expected);
    }

    #[test]
    fn test_inactive_premium_gets_default_features() {
        let sub = subscription(Tier::Lifetime, SubscriptionStatus::Expired, None);
        assert_eq!(sub.features(at(10)), SubscriptionFeatures::default());
        assert!(!sub.has_unlimited_credits(at(10)));
    }

    #[test]
    fn test_blueprint_is_never_unlimited() {
        let features = Tier::Premium.features();
        assert!(features.is_unlimited(CreditKind::Voice));
        assert!(!features.is_unlimited(CreditKind::Blueprint));
    }

    #[test]
    fn test_upgraded_lifetime_has_no_renewal() {
        let sub = Subscription::upgraded(Tier::Lifetime, None, None, at(1));
        assert_eq!(sub.renewal_date, None);

        let monthly = Subscription::upgraded(Tier::Basic, None, None, at(1));
        assert_eq!(
            monthly.renewal_date,
            Some(Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_cancel_keeps_existing_end_date() {
        let mut sub = Subscription::upgraded(Tier::Basic, None, None, at(1));
        let renewal = sub.renewal_date;

        sub.cancel(at(2));
        assert_eq!(sub.end_date, renewal);

        sub.renewal_date = Some(at(28));
        sub.cancel(at(3));
        assert_eq!(sub.end_date, renewal);
        assert_eq!(sub.canceled_at, Some(at(3)));
    }

    #[test]
    fn test_cancel_without_renewal_has_no_end() {
        let mut sub = Subscription::upgraded(Tier::Lifetime, None, None, at(1));
        sub.cancel(at(2));
        assert_eq!(sub.status, SubscriptionStatus::Canceled);
        assert_eq!(sub.end_date, None);
        assert!(sub.is_active(at(28)));
    }

    #[test]
    fn test_renew_clears_cancellation() {
        let mut sub = Subscription::upgraded(Tier::Premium, None, None, at(1));
        sub.cancel(at(2));
        sub.renew(at(15));

        assert_eq!(sub.status, SubscriptionStatus::Active);
        assert_eq!(sub.canceled_at, None);
        assert_eq!(sub.end_date, None);
        assert_eq!(
            sub.renewal_date,
            Some(Utc.with_ymd_and_hms(2025, 4, 15, 12, 0, 0).unwrap())
        );
    }

    #[rstest]
    #[case::active_past_end(SubscriptionStatus::Active, Some(5), true)]
    #[case::trial_past_end(SubscriptionStatus::Trial, Some(5), true)]
    #[case::canceled_past_end(SubscriptionStatus::Canceled, Some(10), true)]
    #[case::canceled_future_end(SubscriptionStatus::Canceled, Some(20), false)]
    #[case::no_end(SubscriptionStatus::Active, None, false)]
    #[case::already_expired(SubscriptionStatus::Expired, Some(5), false)]
    fn test_is_due_for_expiry(
        #[case] status: SubscriptionStatus,
        #[case] end: Option<u32>,
        #[case] expected: bool,
    ) {
        let sub = subscription(Tier::Premium, status, end);
        assert_eq!(sub.is_due_for_expiry(at(10)), expected);
    }

    #[test]
    fn test_serialized_field_names() {
        let sub = Subscription::upgraded(
            Tier::Basic,
            Some("stripe".to_string()),
            Some("sub_123".to_string()),
            at(1),
        );
        let json = serde_json::to_value(&sub).unwrap();
        assert_eq!(json["tier"], "basic");
        assert_eq!(json["status"], "active");
        assert_eq!(json["externalSubscriptionId"], "sub_123");
        assert!(json.get("endDate").is_none());
    }
}
