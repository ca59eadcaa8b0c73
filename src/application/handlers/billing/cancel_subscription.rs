//! CancelSubscriptionHandler - downgrades a user when Stripe deletes their subscription.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::{CacheInvalidator, CacheType, SubscriptionRepository};

#[derive(Debug, Clone)]
pub struct CancelSubscriptionCommand {
    pub subscription_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelSubscriptionResult {
    /// Record downgraded to free/canceled.
    Canceled { user_id: UserId },
    /// No record carries this subscription id; nothing written.
    NoMatchingRecord { subscription_id: String },
}

pub struct CancelSubscriptionHandler {
    repository: Arc<dyn SubscriptionRepository>,
    cache: Arc<dyn CacheInvalidator>,
}

impl CancelSubscriptionHandler {
    pub fn new(
        repository: Arc<dyn SubscriptionRepository>,
        cache: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self { repository, cache }
    }

    pub async fn handle(
        &self,
        cmd: CancelSubscriptionCommand,
    ) -> Result<CancelSubscriptionResult, DomainError> {
        let Some(mut record) = self
            .repository
            .find_by_subscription_id(&cmd.subscription_id)
            .await?
        else {
            tracing::warn!(
                subscription_id = %cmd.subscription_id,
                "No subscription record for deleted subscription, skipping"
            );
            return Ok(CancelSubscriptionResult::NoMatchingRecord {
                subscription_id: cmd.subscription_id,
            });
        };

        record.downgrade_to_free(Timestamp::now());

        if !self.repository.update(&record).await? {
            return Ok(CancelSubscriptionResult::NoMatchingRecord {
                subscription_id: cmd.subscription_id,
            });
        }

        tracing::info!(
            user_id = %record.user_id,
            subscription_id = %cmd.subscription_id,
            "Subscription canceled, user downgraded to free"
        );

        self.cache
            .invalidate(&record.user_id, &CacheType::SUBSCRIPTION_CHANGE);

        Ok(CancelSubscriptionResult::Canceled {
            user_id: record.user_id,
        })
    }
}
