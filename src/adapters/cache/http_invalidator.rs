//! HTTP cache invalidator.
//!
//! POSTs `{ "userId": ..., "cacheTypes": [...] }` to the platform's internal
//! invalidation endpoint from a detached task. Nothing is awaited by the
//! caller and every failure ends in a `warn!`.

use std::time::Duration;

use serde::Serialize;
use tokio::runtime::Handle;

use crate::domain::foundation::UserId;
use crate::ports::{CacheInvalidator, CacheType};

/// Request body understood by the internal invalidation endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationRequest {
    pub user_id: String,
    pub cache_types: Vec<CacheType>,
}

#[derive(Debug, Clone)]
pub struct HttpCacheInvalidator {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpCacheInvalidator {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    async fn send(client: reqwest::Client, endpoint: String, request: InvalidationRequest) {
        match client.post(&endpoint).json(&request).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(
                    user_id = %request.user_id,
                    cache_types = ?request.cache_types,
                    "Cache invalidated"
                );
            }
            Ok(response) => {
                tracing::warn!(
                    user_id = %request.user_id,
                    status = %response.status(),
                    "Cache invalidation rejected"
                );
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %request.user_id,
                    error = %e,
                    "Cache invalidation request failed"
                );
            }
        }
    }
}

impl CacheInvalidator for HttpCacheInvalidator {
    fn invalidate(&self, user_id: &UserId, cache_types: &[CacheType]) {
        let request = InvalidationRequest {
            user_id: user_id.to_string(),
            cache_types: cache_types.to_vec(),
        };

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(user_id = %user_id, "No runtime available, cache invalidation dropped");
                return;
            }
        };

        handle.spawn(Self::send(
            self.http_client.clone(),
            self.endpoint.clone(),
            request,
        ));
    }
}
