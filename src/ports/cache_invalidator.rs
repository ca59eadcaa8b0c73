//! Cache invalidation port.
//!
//! Other services cache a user's subscription, tier and profile. After a
//! write the reconciler asks them to drop those entries. The call is
//! fire-and-forget: `invalidate` returns immediately and failures are
//! only ever logged.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

/// Caches keyed by user that depend on subscription state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    Subscription,
    Tier,
    Profile,
}

impl CacheType {
    /// Every cache touched by a subscription change.
    pub const SUBSCRIPTION_CHANGE: [CacheType; 3] =
        [CacheType::Subscription, CacheType::Tier, CacheType::Profile];
}

pub trait CacheInvalidator: Send + Sync {
    /// Schedule invalidation for `user_id`. Must not block or fail the caller.
    fn invalidate(&self, user_id: &UserId, cache_types: &[CacheType]);
}
