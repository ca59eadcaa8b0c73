//! SyncSubscriptionHandler - mirrors a Stripe subscription onto the user's record.
//!
//! Handles `customer.subscription.created` / `.updated` and the re-fetched
//! subscription after a checkout completes.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::subscription::{
    PriceTierTable, StripeSubscription, SubscriptionSnapshot, SubscriptionStatus, SubscriptionTier,
};
use crate::ports::{CacheInvalidator, CacheType, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct SyncSubscriptionCommand {
    pub subscription: StripeSubscription,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncSubscriptionResult {
    /// Record overwritten with Stripe's snapshot.
    Synced {
        user_id: UserId,
        tier: SubscriptionTier,
        status: SubscriptionStatus,
    },
    /// No record carries this customer id; nothing written.
    NoMatchingRecord { customer_id: String },
}

pub struct SyncSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    cache: Arc<dyn CacheInvalidator>,
    prices: Arc<PriceTierTable>,
}

impl SyncSubscriptionHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        cache: Arc<dyn CacheInvalidator>,
        prices: Arc<PriceTierTable>,
    ) -> Self {
        Self {
            repository,
            cache,
            prices,
        }
    }

    pub async fn handle(
        &self,
        cmd: SyncSubscriptionCommand,
    ) -> Result<SyncSubscriptionResult, DomainError> {
        let snapshot = SubscriptionSnapshot::from_stripe(&cmd.subscription, &self.prices);

        let Some(mut record) = self
            .repository
            .find_by_customer_id(&snapshot.customer_id)
            .await?
        else {
            tracing::warn!(
                customer_id = %snapshot.customer_id,
                subscription_id = %snapshot.subscription_id,
                "No subscription record for customer, skipping"
            );
            return Ok(SyncSubscriptionResult::NoMatchingRecord {
                customer_id: snapshot.customer_id,
            });
        };

        if snapshot.tier == SubscriptionTier::Free && snapshot.price_id.is_some() {
            tracing::warn!(
                price_id = ?snapshot.price_id,
                subscription_id = %snapshot.subscription_id,
                "Unrecognized price id, mapping to free tier"
            );
        }

        record.apply_snapshot(&snapshot, Timestamp::now());

        if !self.repository.update(&record).await? {
            tracing::warn!(
                user_id = %record.user_id,
                "Subscription record disappeared before update"
            );
            return Ok(SyncSubscriptionResult::NoMatchingRecord {
                customer_id: snapshot.customer_id,
            });
        }

        tracing::info!(
            user_id = %record.user_id,
            subscription_id = %snapshot.subscription_id,
            tier = %record.tier,
            status = %record.status,
            "Subscription synced"
        );

        self.cache
            .invalidate(&record.user_id, &CacheType::SUBSCRIPTION_CHANGE);

        Ok(SyncSubscriptionResult::Synced {
            user_id: record.user_id,
            tier: record.tier,
            status: record.status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::RecordingCacheInvalidator;
    use crate::adapters::memory::InMemorySubscriptionRepository;
    use crate::domain::foundation::ErrorCode;
    use crate::domain::subscription::{SubscriptionRecord, PLUS_MONTHLY_PRICE_ID};
    use serde_json::json;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        repo: InMemorySubscriptionRepository,
        cache: RecordingCacheInvalidator,
        handler: SyncSubscriptionHandler,
    }

    fn fixture() -> Fixture {
        let repo = InMemorySubscriptionRepository::new();
        let cache = RecordingCacheInvalidator::new();
        let handler = SyncSubscriptionHandler::new(
            Arc::new(repo.clone()),
            Arc::new(cache.clone()),
            Arc::new(PriceTierTable::default()),
        );
        Fixture {
            repo,
            cache,
            handler,
        }
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    async fn seed_customer(repo: &InMemorySubscriptionRepository, customer: &str) {
        let mut record = SubscriptionRecord::new_free(user(), Timestamp::now());
        record.stripe_customer_id = Some(customer.to_string());
        repo.insert(record).await;
    }

    fn subscription(customer: &str, price: &str, status: &str) -> StripeSubscription {
        serde_json::from_value(json!({
            "id": "sub_1",
            "customer": customer,
            "status": status,
            "current_period_start": 1699913600,
            "current_period_end": 1702592000,
            "cancel_at_period_end": false,
            "items": { "data": [{ "price": { "id": price } }] }
        }))
        .unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn syncs_known_customer_to_plus() {
        let f = fixture();
        seed_customer(&f.repo, "cus_1").await;

        let result = f
            .handler
            .handle(SyncSubscriptionCommand {
                subscription: subscription("cus_1", PLUS_MONTHLY_PRICE_ID, "active"),
            })
            .await
            .unwrap();

        assert_eq!(
            result,
            SyncSubscriptionResult::Synced {
                user_id: user(),
                tier: SubscriptionTier::Plus,
                status: SubscriptionStatus::Active,
            }
        );
        let stored = f.repo.get(&user()).await.unwrap();
        assert_eq!(stored.stripe_subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(
            stored.current_period_end.unwrap().to_iso8601(),
            "2023-12-14T22:13:20Z"
        );
    }

    #[tokio::test]
    async fn invalidates_all_user_caches_after_write() {
        let f = fixture();
        seed_customer(&f.repo, "cus_1").await;

        f.handler
            .handle(SyncSubscriptionCommand {
                subscription: subscription("cus_1", PLUS_MONTHLY_PRICE_ID, "active"),
            })
            .await
            .unwrap();

        let calls = f.cache.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].user_id, user());
        assert_eq!(calls[0].cache_types, CacheType::SUBSCRIPTION_CHANGE.to_vec());
    }

    #[tokio::test]
    async fn unknown_customer_writes_nothing() {
        let f = fixture();
        seed_customer(&f.repo, "cus_1").await;

        let result = f
            .handler
            .handle(SyncSubscriptionCommand {
                subscription: subscription("cus_unknown", PLUS_MONTHLY_PRICE_ID, "active"),
            })
            .await
            .unwrap();

        assert!(matches!(result, SyncSubscriptionResult::NoMatchingRecord { ref customer_id } if customer_id == "cus_unknown"));
        assert_eq!(f.repo.write_count(), 0);
        assert!(f.cache.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_price_downgrades_to_free() {
        let f = fixture();
        seed_customer(&f.repo, "cus_1").await;

        f.handler
            .handle(SyncSubscriptionCommand {
                subscription: subscription("cus_1", "price_retired", "past_due"),
            })
            .await
            .unwrap();

        let stored = f.repo.get(&user()).await.unwrap();
        assert_eq!(stored.tier, SubscriptionTier::Free);
        assert_eq!(stored.status, SubscriptionStatus::PastDue);
    }

    #[tokio::test]
    async fn replaying_same_event_is_idempotent() {
        let f = fixture();
        seed_customer(&f.repo, "cus_1").await;
        let cmd = SyncSubscriptionCommand {
            subscription: subscription("cus_1", PLUS_MONTHLY_PRICE_ID, "active"),
        };

        f.handler.handle(cmd.clone()).await.unwrap();
        let mut first = f.repo.get(&user()).await.unwrap();
        f.handler.handle(cmd).await.unwrap();
        let second = f.repo.get(&user()).await.unwrap();

        first.updated_at = second.updated_at;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn storage_failure_propagates() {
        let f = fixture();
        f.repo.set_storage_failure(true);

        let err = f
            .handler
            .handle(SyncSubscriptionCommand {
                subscription: subscription("cus_1", PLUS_MONTHLY_PRICE_ID, "active"),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(f.cache.calls().is_empty());
    }
}
