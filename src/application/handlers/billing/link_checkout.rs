//! LinkCheckoutHandler - ties a completed Stripe checkout to a platform user.
//!
//! The checkout session carries the user id in its metadata. Both Stripe
//! ids are written onto that user's record, then the subscription is read
//! back from Stripe and synced so the tier is correct before the
//! `customer.subscription.*` events arrive.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::StripeCheckoutSession;
use crate::ports::{CacheInvalidator, CacheType, PaymentProvider, SubscriptionRepository};

use super::{SyncSubscriptionCommand, SyncSubscriptionHandler, SyncSubscriptionResult};

#[derive(Debug, Clone)]
pub struct LinkCheckoutCommand {
    pub session: StripeCheckoutSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkCheckoutResult {
    /// Ids written; `subscription_synced` tells whether the re-fetch and sync succeeded.
    Linked {
        user_id: UserId,
        subscription_synced: bool,
    },
    /// Session lacked something required; nothing written.
    Skipped { reason: String },
    /// The metadata user has no subscription record.
    NoMatchingRecord { user_id: UserId },
}

pub struct LinkCheckoutHandler {
    repository: Arc<dyn SubscriptionRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    sync: Arc<SyncSubscriptionHandler>,
    cache: Arc<dyn CacheInvalidator>,
}

impl LinkCheckoutHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        sync: Arc<SyncSubscriptionHandler>,
        cache: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self {
            repository,
            payment_provider,
            sync,
            cache,
        }
    }

    pub async fn handle(&self, cmd: LinkCheckoutCommand) -> Result<LinkCheckoutResult, DomainError> {
        let session = cmd.session;

        let (Some(customer_id), Some(subscription_id)) =
            (session.customer.as_deref(), session.subscription.as_deref())
        else {
            tracing::warn!(
                session_id = %session.id,
                "Checkout session has no customer or subscription, skipping"
            );
            return Ok(skipped("checkout session has no customer or subscription"));
        };

        let Some(user_id) = session.user_id().and_then(|id| UserId::new(id).ok()) else {
            tracing::warn!(
                session_id = %session.id,
                customer_id = %customer_id,
                "Checkout session metadata has no user_id, skipping"
            );
            return Ok(skipped("checkout session metadata has no user_id"));
        };

        let linked = self
            .repository
            .link_stripe_ids(&user_id, customer_id, subscription_id)
            .await?;
        if !linked {
            tracing::warn!(
                user_id = %user_id,
                session_id = %session.id,
                "No subscription record for checkout user, skipping"
            );
            return Ok(LinkCheckoutResult::NoMatchingRecord { user_id });
        }

        tracing::info!(
            user_id = %user_id,
            customer_id = %customer_id,
            subscription_id = %subscription_id,
            "Checkout linked to user"
        );

        let subscription_synced = self.sync_from_provider(subscription_id).await?;

        // The sync already invalidated when it wrote.
        if !subscription_synced {
            self.cache
                .invalidate(&user_id, &CacheType::SUBSCRIPTION_CHANGE);
        }

        Ok(LinkCheckoutResult::Linked {
            user_id,
            subscription_synced,
        })
    }

    /// Provider failures are logged, not propagated; storage failures are.
    async fn sync_from_provider(&self, subscription_id: &str) -> Result<bool, DomainError> {
        let subscription = match self.payment_provider.get_subscription(subscription_id).await {
            Ok(Some(subscription)) => subscription,
            Ok(None) => {
                tracing::warn!(
                    subscription_id = %subscription_id,
                    "Subscription from checkout not found at Stripe"
                );
                return Ok(false);
            }
            Err(e) => {
                tracing::warn!(
                    subscription_id = %subscription_id,
                    error = %e,
                    "Failed to fetch subscription after checkout"
                );
                return Ok(false);
            }
        };

        let result = self.sync.handle(SyncSubscriptionCommand { subscription }).await?;
        Ok(matches!(result, SyncSubscriptionResult::Synced { .. }))
    }
}

fn skipped(reason: &str) -> LinkCheckoutResult {
    LinkCheckoutResult::Skipped {
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::RecordingCacheInvalidator;
    use crate::adapters::memory::InMemorySubscriptionRepository;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::foundation::Timestamp;
    use crate::domain::subscription::{
        PriceTierTable, SubscriptionRecord, SubscriptionTier, PLUS_MONTHLY_PRICE_ID,
    };
    use crate::ports::PaymentError;
    use serde_json::json;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Helpers
    // ════════════════════════════════════════════════════════════════════════════

    struct Fixture {
        repo: InMemorySubscriptionRepository,
        provider: MockPaymentProvider,
        cache: RecordingCacheInvalidator,
        handler: LinkCheckoutHandler,
    }

    fn fixture() -> Fixture {
        let repo = InMemorySubscriptionRepository::new();
        let provider = MockPaymentProvider::new();
        let cache = RecordingCacheInvalidator::new();
        let sync = Arc::new(SyncSubscriptionHandler::new(
            Arc::new(repo.clone()),
            Arc::new(cache.clone()),
            Arc::new(PriceTierTable::default()),
        ));
        let handler = LinkCheckoutHandler::new(
            Arc::new(repo.clone()),
            Arc::new(provider.clone()),
            sync,
            Arc::new(cache.clone()),
        );
        Fixture {
            repo,
            provider,
            cache,
            handler,
        }
    }

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    async fn seed_user(repo: &InMemorySubscriptionRepository) {
        repo.insert(SubscriptionRecord::new_free(user(), Timestamp::now()))
            .await;
    }

    fn session(value: serde_json::Value) -> LinkCheckoutCommand {
        LinkCheckoutCommand {
            session: serde_json::from_value(value).unwrap(),
        }
    }

    fn complete_session() -> LinkCheckoutCommand {
        session(json!({
            "id": "cs_1",
            "customer": "cus_1",
            "subscription": "sub_1",
            "mode": "subscription",
            "metadata": { "user_id": "user-1" }
        }))
    }

    fn plus_subscription() -> crate::domain::subscription::StripeSubscription {
        serde_json::from_value(json!({
            "id": "sub_1",
            "customer": "cus_1",
            "status": "active",
            "current_period_start": 1699913600,
            "current_period_end": 1702592000,
            "items": { "data": [{ "price": { "id": PLUS_MONTHLY_PRICE_ID } }] }
        }))
        .unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn links_ids_and_syncs_tier() {
        let f = fixture();
        seed_user(&f.repo).await;
        f.provider.add_subscription(plus_subscription());

        let result = f.handler.handle(complete_session()).await.unwrap();

        assert_eq!(
            result,
            LinkCheckoutResult::Linked {
                user_id: user(),
                subscription_synced: true
            }
        );
        let stored = f.repo.get(&user()).await.unwrap();
        assert_eq!(stored.stripe_customer_id.as_deref(), Some("cus_1"));
        assert_eq!(stored.stripe_subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(stored.tier, SubscriptionTier::Plus);
        assert_eq!(f.provider.requested_subscriptions(), vec!["sub_1".to_string()]);
        assert_eq!(f.cache.calls().len(), 1);
    }

    #[tokio::test]
    async fn missing_user_id_writes_nothing() {
        let f = fixture();
        seed_user(&f.repo).await;

        let result = f
            .handler
            .handle(session(json!({
                "id": "cs_1",
                "customer": "cus_1",
                "subscription": "sub_1",
                "metadata": {}
            })))
            .await
            .unwrap();

        assert!(matches!(result, LinkCheckoutResult::Skipped { .. }));
        assert_eq!(f.repo.write_count(), 0);
        assert_eq!(f.provider.call_count(), 0);
        assert!(f.cache.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_subscription_writes_nothing() {
        let f = fixture();
        seed_user(&f.repo).await;

        let result = f
            .handler
            .handle(session(json!({
                "id": "cs_1",
                "customer": "cus_1",
                "mode": "payment",
                "metadata": { "user_id": "user-1" }
            })))
            .await
            .unwrap();

        assert!(matches!(result, LinkCheckoutResult::Skipped { .. }));
        assert_eq!(f.repo.write_count(), 0);
    }

    #[tokio::test]
    async fn unknown_user_is_reported() {
        let f = fixture();

        let result = f.handler.handle(complete_session()).await.unwrap();

        assert_eq!(result, LinkCheckoutResult::NoMatchingRecord { user_id: user() });
        assert_eq!(f.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn provider_failure_still_links_and_invalidates() {
        let f = fixture();
        seed_user(&f.repo).await;
        f.provider.set_error(PaymentError::network("connection reset"));

        let result = f.handler.handle(complete_session()).await.unwrap();

        assert_eq!(
            result,
            LinkCheckoutResult::Linked {
                user_id: user(),
                subscription_synced: false
            }
        );
        let stored = f.repo.get(&user()).await.unwrap();
        assert_eq!(stored.stripe_subscription_id.as_deref(), Some("sub_1"));
        assert_eq!(stored.tier, SubscriptionTier::Free);
        assert_eq!(f.cache.invalidated_users(), vec![user()]);
    }

    #[tokio::test]
    async fn storage_failure_propagates() {
        let f = fixture();
        seed_user(&f.repo).await;
        f.repo.set_storage_failure(true);

        assert!(f.handler.handle(complete_session()).await.is_err());
    }
}
