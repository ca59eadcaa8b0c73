//! Recording invalidator for tests.

use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::foundation::UserId;
use crate::ports::{CacheInvalidator, CacheType};

/// A single recorded `invalidate` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationCall {
    pub user_id: UserId,
    pub cache_types: Vec<CacheType>,
}

/// Captures invalidation calls instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct RecordingCacheInvalidator {
    calls: Arc<Mutex<Vec<InvalidationCall>>>,
}

impl RecordingCacheInvalidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<InvalidationCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn invalidated_users(&self) -> Vec<UserId> {
        self.calls().into_iter().map(|c| c.user_id).collect()
    }
}

impl CacheInvalidator for RecordingCacheInvalidator {
    fn invalidate(&self, user_id: &UserId, cache_types: &[CacheType]) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(InvalidationCall {
                user_id: user_id.clone(),
                cache_types: cache_types.to_vec(),
            });
    }
}
