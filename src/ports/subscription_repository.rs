//! Subscription repository port.
//!
//! Read/write access to the `user_subscriptions` table. The reconciler
//! never inserts: rows are created by the account service at signup.
//!
//! # Example
//!
//! ```ignore
//! async fn downgrade(
//!     repo: &dyn SubscriptionRepository,
//!     subscription_id: &str,
//! ) -> Result<(), DomainError> {
//!     if let Some(mut record) = repo.find_by_subscription_id(subscription_id).await? {
//!         record.downgrade_to_free(Timestamp::now());
//!         repo.update(&record).await?;
//!     }
//!     Ok(())
//! }
//! ```

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::subscription::SubscriptionRecord;
use async_trait::async_trait;

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find the record carrying this Stripe customer id.
    async fn find_by_customer_id(
        &self,
        customer_id: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;

    /// Find the record carrying this Stripe subscription id.
    async fn find_by_subscription_id(
        &self,
        subscription_id: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;

    /// Overwrite every mutable column of the row keyed by `record.user_id`.
    ///
    /// Returns `false` when no row matched.
    async fn update(&self, record: &SubscriptionRecord) -> Result<bool, DomainError>;

    /// Write both Stripe ids onto the user's row in a single statement.
    ///
    /// Returns `false` when no row matched.
    async fn link_stripe_ids(
        &self,
        user_id: &UserId,
        customer_id: &str,
        subscription_id: &str,
    ) -> Result<bool, DomainError>;
}
