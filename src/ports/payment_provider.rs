//! Payment provider port.
//!
//! The reconciler only needs to read a subscription back from Stripe
//! after a checkout completes; everything else arrives by webhook.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::subscription::StripeSubscription;

#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Get subscription by provider ID.
    ///
    /// Returns `Ok(None)` when the provider has no such subscription.
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<StripeSubscription>, PaymentError>;
}

/// Failure talking to the payment provider.
#[derive(Debug, Clone, Error)]
#[error("{code}: {message}")]
pub struct PaymentError {
    pub code: PaymentErrorCode,
    pub message: String,
    /// Stripe's own `error.code`, when the response carried one.
    pub provider_code: Option<String>,
}

impl PaymentError {
    pub fn new(code: PaymentErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            provider_code: None,
        }
    }

    pub fn with_provider_code(mut self, provider_code: impl Into<String>) -> Self {
        self.provider_code = Some(provider_code.into());
        self
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::NetworkError, message)
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidResponse, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(PaymentErrorCode::InvalidRequest, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentErrorCode {
    NetworkError,
    AuthenticationError,
    RateLimited,
    ProviderError,
    InvalidResponse,
    /// Request rejected locally before reaching the provider.
    InvalidRequest,
}

impl PaymentErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "network_error",
            Self::AuthenticationError => "authentication_error",
            Self::RateLimited => "rate_limited",
            Self::ProviderError => "provider_error",
            Self::InvalidResponse => "invalid_response",
            Self::InvalidRequest => "invalid_request",
        }
    }
}

impl std::fmt::Display for PaymentErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_can_be_shared_as_trait_object() {
        fn _takes(_: std::sync::Arc<dyn PaymentProvider>) {}
    }

    #[test]
    fn display_includes_code_and_message() {
        let err = PaymentError::new(PaymentErrorCode::ProviderError, "HTTP 502")
            .with_provider_code("api_error");
        assert_eq!(err.to_string(), "provider_error: HTTP 502");
        assert_eq!(err.provider_code.as_deref(), Some("api_error"));
    }
}
