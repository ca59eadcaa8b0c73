//! Cache invalidation configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Platform cache invalidation endpoint. Invalidation is disabled when no
/// URL is set.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub invalidation_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl CacheConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn is_enabled(&self) -> bool {
        self.invalidation_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = self.invalidation_url.as_deref().filter(|u| !u.trim().is_empty()) {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidCacheUrl);
            }
        }
        if self.timeout_ms == 0 {
            return Err(ValidationError::InvalidCacheTimeout);
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            invalidation_url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    2000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_by_default() {
        let config = CacheConfig::default();
        assert!(!config.is_enabled());
        assert_eq!(config.timeout(), Duration::from_millis(2000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_url_is_disabled() {
        let config = CacheConfig {
            invalidation_url: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!config.is_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_non_http_url() {
        let config = CacheConfig {
            invalidation_url: Some("redis://cache:6379".to_string()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidCacheUrl));
    }

    #[test]
    fn rejects_zero_timeout() {
        let config = CacheConfig {
            invalidation_url: Some("http://app:3000/api/internal/cache".to_string()),
            timeout_ms: 0,
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidCacheTimeout));
    }
}
