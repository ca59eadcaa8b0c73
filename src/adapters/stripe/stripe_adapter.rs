//! Stripe payment provider adapter.
//!
//! Reads subscriptions from the Stripe REST API with the account's secret
//! key as the basic-auth user.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key).with_base_url("http://localhost:12111");
//! let adapter = StripePaymentAdapter::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::subscription::StripeSubscription;
use crate::ports::{PaymentError, PaymentErrorCode, PaymentProvider};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    timeout: Duration,
}

impl StripeConfig {
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set a custom API base URL (stripe-mock, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

}

/// Stripe object ids are `prefix_` plus alphanumerics; anything else would
/// alter the request path.
fn is_stripe_object_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Error body returned by the Stripe API.
#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeApiError,
}

#[derive(Debug, Deserialize)]
struct StripeApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    async fn error_from_response(response: reqwest::Response) -> PaymentError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<StripeErrorBody>(&body).ok();

        let message = parsed
            .as_ref()
            .and_then(|b| b.error.message.clone())
            .unwrap_or_else(|| format!("Stripe API returned {}", status));

        let code = match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                PaymentErrorCode::AuthenticationError
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => PaymentErrorCode::RateLimited,
            _ => PaymentErrorCode::ProviderError,
        };

        let mut error = PaymentError::new(code, message);
        if let Some(provider_code) = parsed.and_then(|b| b.error.code) {
            error = error.with_provider_code(provider_code);
        }
        error
    }
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<StripeSubscription>, PaymentError> {
        if !is_stripe_object_id(subscription_id) {
            tracing::warn!(subscription_id = %subscription_id, "Refusing malformed subscription id");
            return Err(PaymentError::invalid_request(format!(
                "'{}' is not a Stripe object id",
                subscription_id
            )));
        }

        let url = format!(
            "{}/v1/subscriptions/{}",
            self.config.api_base_url, subscription_id
        );

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    subscription_id = %subscription_id,
                    error = %e,
                    "Stripe request failed"
                );
                PaymentError::network(e.to_string())
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!(subscription_id = %subscription_id, "Stripe subscription not found");
            return Ok(None);
        }

        if !response.status().is_success() {
            let error = Self::error_from_response(response).await;
            tracing::warn!(
                subscription_id = %subscription_id,
                code = %error.code,
                error = %error.message,
                "Stripe API error"
            );
            return Err(error);
        }

        let subscription: StripeSubscription = response.json().await.map_err(|e| {
            PaymentError::invalid_response(format!("Failed to parse Stripe response: {}", e))
        })?;

        Ok(Some(subscription))
    }
}
