//! Invalidator used when no invalidation endpoint is configured.

use crate::domain::foundation::UserId;
use crate::ports::{CacheInvalidator, CacheType};

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCacheInvalidator;

impl CacheInvalidator for NoopCacheInvalidator {
    fn invalidate(&self, user_id: &UserId, cache_types: &[CacheType]) {
        tracing::debug!(
            user_id = %user_id,
            cache_types = ?cache_types,
            "Cache invalidation skipped, no endpoint configured"
        );
    }
}
