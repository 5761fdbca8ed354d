//! End-to-end integration tests
//!
//! These tests drive the public API the way request handlers and the sweeper
//! do: one `Economy` wired over a shared in-memory store. They cover:
//! - Non-negativity and the exactly-one-winner race under concurrency
//! - Redemption end to end, including the disabled reward
//! - Subscription lifecycle: lame-duck cancel, upgrade overwrite, expiry
//! - Sweeping a snapshot file and writing it back

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use kudos_economy::core::traits::BalanceStore;
    use kudos_economy::{
        Authorization, CreditKind, Economy, EconomyError, EngineConfig, KudosKind,
        MemoryAuditSink, MemoryStore, RewardType, SubscriptionStatus, SweepConfig, Tier,
        UserBalanceRecord, UserId,
    };
    use rstest::rstest;
    use std::sync::Arc;

    struct Harness {
        economy: Economy,
        store: Arc<MemoryStore>,
        audit: Arc<MemoryAuditSink>,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let economy = Economy::new(
            store.clone(),
            audit.clone(),
            EngineConfig::default(),
            SweepConfig::default(),
        );
        Harness {
            economy,
            store,
            audit,
        }
    }

    fn jan(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, 8, 0, 0).unwrap()
    }

    /// Race `balance + 1` single-credit consumes against a balance of `balance`
    ///
    /// Exactly `balance` succeed and exactly one is refused.
    #[rstest]
    #[case::last_credit(1)]
    #[case::few_credits(3)]
    #[case::many_credits(40)]
    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_exactly_one_winner_race(#[case] balance: u64) {
        let h = harness();
        let user = UserId::from("racer");
        h.economy.open_account(&user, Utc::now()).await.unwrap();
        h.economy
            .credits
            .add(&user, CreditKind::Analytics, balance)
            .await
            .unwrap();

        let tasks = (0..=balance).map(|_| {
            let credits = h.economy.credits.clone();
            let user = user.clone();
            tokio::spawn(async move { credits.consume(&user, CreditKind::Analytics, 1).await })
        });
        let results: Vec<_> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|joined| joined.unwrap())
            .collect();

        let succeeded = results.iter().filter(|r| r.is_ok()).count() as u64;
        let refused = results
            .iter()
            .filter(|r| matches!(r, Err(EconomyError::InsufficientFunds { .. })))
            .count();
        assert_eq!(succeeded, balance);
        assert_eq!(refused, 1);

        let credits = h.economy.credits.get_all(&user).await.unwrap();
        assert_eq!(credits.get(CreditKind::Analytics), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_mixed_consume_and_add_stay_non_negative() {
        let h = harness();
        let user = UserId::from("mixed");
        h.economy.open_account(&user, Utc::now()).await.unwrap();

        // Starter voice balance is 10; 30 consumes race 10 single grants.
        let mut handles = vec![];
        for i in 0..40 {
            let credits = h.economy.credits.clone();
            let user = user.clone();
            handles.push(tokio::spawn(async move {
                if i % 4 == 0 {
                    credits.add(&user, CreditKind::Voice, 1).await.map(|_| true)
                } else {
                    match credits.consume(&user, CreditKind::Voice, 1).await {
                        Ok(_) => Ok(true),
                        Err(EconomyError::InsufficientFunds { .. }) => Ok(false),
                        Err(e) => Err(e),
                    }
                }
            }));
        }

        let mut consumed = 0u64;
        for (i, handle) in handles.into_iter().enumerate() {
            let applied = handle.await.unwrap().unwrap();
            if i % 4 != 0 && applied {
                consumed += 1;
            }
        }

        let balance = h
            .economy
            .credits
            .get_all(&user)
            .await
            .unwrap()
            .get(CreditKind::Voice);
        assert_eq!(balance, 10 + 10 - consumed);

        // Every audited voice delta reconciles with the final balance.
        let net: i64 = h.audit.events().iter().map(|e| e.delta).sum();
        assert_eq!(10 + net, balance as i64);
    }

    #[tokio::test]
    async fn test_redemption_end_to_end() {
        let h = harness();
        let user = UserId::from("giver");
        h.economy.open_account(&user, Utc::now()).await.unwrap();
        for _ in 0..12 {
            h.economy
                .kudos
                .add(&user, KudosKind::Encouragements, 1)
                .await
                .unwrap();
        }

        let receipt = h
            .economy
            .redemptions
            .redeem_str(&user, "voice", "encouragements")
            .await
            .unwrap();

        assert_eq!(receipt.kudos_remaining, 0);
        assert_eq!(receipt.credits_received, 2);
        let record = h.economy.account(&user).await.unwrap();
        assert_eq!(record.kudos.get(KudosKind::Encouragements), 0);
        assert_eq!(record.credits.get(CreditKind::Voice), 12);

        let again = h
            .economy
            .redemptions
            .redeem(&user, RewardType::Voice, KudosKind::Encouragements)
            .await;
        assert!(matches!(
            again,
            Err(EconomyError::InsufficientFunds {
                required: 12,
                available: 0,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_disabled_reward_leaves_balance_unchanged() {
        let h = harness();
        let user = UserId::from("early");
        h.economy.open_account(&user, Utc::now()).await.unwrap();
        h.economy
            .kudos
            .add(&user, KudosKind::Congratulations, 24)
            .await
            .unwrap();
        let before = h.economy.account(&user).await.unwrap();
        let audited = h.audit.len();

        let result = h
            .economy
            .redemptions
            .redeem_str(&user, "integration", "congratulations")
            .await;

        assert_eq!(
            result,
            Err(EconomyError::not_yet_available(RewardType::Integration))
        );
        assert!(result.unwrap_err().is_business_outcome());
        assert_eq!(h.economy.account(&user).await.unwrap(), before);
        assert_eq!(h.audit.len(), audited);
    }

    #[tokio::test]
    async fn test_cancel_is_lame_duck_until_sweep() {
        let h = harness();
        let user = UserId::from("subscriber");
        h.economy.open_account(&user, jan(1)).await.unwrap();
        let upgraded = h
            .economy
            .subscriptions
            .upgrade(&user, Tier::Premium, Some("stripe".into()), None, jan(1))
            .await
            .unwrap();
        h.economy.subscriptions.cancel(&user, jan(5)).await.unwrap();
        let end = upgraded.renewal_date.unwrap();

        // Still premium until the paid period runs out.
        let gate = &h.economy.entitlements;
        assert_eq!(
            gate.authorize(&user, CreditKind::Voice, jan(20)).await,
            Ok(Authorization::Unlimited)
        );
        assert!(
            h.economy
                .subscriptions
                .features(&user, jan(20))
                .await
                .unwrap()
                .unlimited_groups
        );

        // Before the end date the sweep leaves it alone.
        assert_eq!(h.economy.sweep.run_once(jan(20)).await.unwrap().expired, 0);

        let after_end = end + Duration::hours(1);
        assert_eq!(h.economy.sweep.run_once(after_end).await.unwrap().expired, 1);
        assert_eq!(h.economy.sweep.run_once(after_end).await.unwrap().expired, 0);

        let subscription = h.economy.subscriptions.get(&user).await.unwrap();
        assert_eq!(subscription.tier, Tier::Free);
        assert_eq!(subscription.status, SubscriptionStatus::Expired);
        assert_eq!(
            gate.authorize(&user, CreditKind::Voice, after_end).await,
            Ok(Authorization::Consumed { remaining: 9 })
        );
    }

    #[tokio::test]
    async fn test_upgrade_overwrites_cancellation() {
        let h = harness();
        let user = UserId::from("returning");
        h.economy.open_account(&user, jan(1)).await.unwrap();
        h.economy
            .subscriptions
            .upgrade(&user, Tier::Basic, None, None, jan(1))
            .await
            .unwrap();
        let canceled = h.economy.subscriptions.cancel(&user, jan(2)).await.unwrap();
        assert!(canceled.end_date.is_some());

        h.economy
            .subscriptions
            .upgrade(&user, Tier::Premium, None, Some("sub_9".into()), jan(3))
            .await
            .unwrap();

        let subscription = h.economy.subscriptions.get(&user).await.unwrap();
        assert_eq!(subscription.tier, Tier::Premium);
        assert_eq!(subscription.status, SubscriptionStatus::Active);
        assert_eq!(subscription.end_date, None);
        assert_eq!(subscription.canceled_at, None);
        assert_eq!(subscription.external_subscription_id.as_deref(), Some("sub_9"));
    }

    #[tokio::test]
    async fn test_spend_with_refund_through_economy() {
        let h = harness();
        let user = UserId::from("caller");
        h.economy.open_account(&user, Utc::now()).await.unwrap();

        let result: Result<(), EconomyError> = h
            .economy
            .credits
            .spend_with_refund(&user, CreditKind::Blueprint, || async {
                Err(EconomyError::unavailable("generate", "model timed out"))
            })
            .await;

        assert!(matches!(result, Err(EconomyError::Unavailable { .. })));
        let record = h.store.load(&user).await.unwrap();
        assert_eq!(record.credits.get(CreditKind::Blueprint), 5);
    }

    #[tokio::test]
    async fn test_snapshot_sweep_round_trip() {
        let now = Utc::now();
        let mut lapsed = UserBalanceRecord::new(UserId::from("lapsed"), now - Duration::days(40));
        lapsed.subscription.tier = Tier::Basic;
        lapsed.subscription.status = SubscriptionStatus::Canceled;
        lapsed.subscription.end_date = Some(now - Duration::days(2));
        let current = UserBalanceRecord::new(UserId::from("current"), now);

        let file = tempfile::NamedTempFile::new().unwrap();
        MemoryStore::from_records([lapsed, current])
            .write_snapshot(file.path())
            .unwrap();

        let store = Arc::new(MemoryStore::load_snapshot(file.path()).unwrap());
        let sweep = kudos_economy::ExpirationSweep::new(store.clone(), SweepConfig::default());
        assert_eq!(sweep.run_once(now).await.unwrap().expired, 1);
        store.write_snapshot(file.path()).unwrap();

        let reloaded = MemoryStore::load_snapshot(file.path()).unwrap();
        let lapsed = reloaded.load(&UserId::from("lapsed")).await.unwrap();
        assert_eq!(lapsed.subscription.tier, Tier::Free);
        assert_eq!(lapsed.subscription.status, SubscriptionStatus::Expired);
        let current = reloaded.load(&UserId::from("current")).await.unwrap();
        assert_eq!(current.subscription.status, SubscriptionStatus::Active);
        assert_eq!(current.credits.get(CreditKind::Voice), 10);
    }

    #[test]
    fn test_snapshot_uses_document_field_names() {
        let record = UserBalanceRecord::new(UserId::from("u1"), jan(1));
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["userId"], "u1");
        assert_eq!(json["credits"]["naturalLanguage"], 0);
        assert_eq!(json["credits"]["voice"], 10);
        assert_eq!(json["kudos"]["encouragements"], 0);
        assert_eq!(json["subscription"]["tier"], "free");
        assert_eq!(json["subscription"]["status"], "active");
    }
}
