//! Payment configuration

use secrecy::SecretString;
use serde::Deserialize;

use crate::domain::subscription::{PriceTierTable, DEFAULT_TOLERANCE_SECS};

use super::error::ValidationError;

const MAX_TOLERANCE_SECS: i64 = 3600;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key, used to re-fetch subscriptions
    pub stripe_api_key: String,

    /// Stripe webhook signing secret
    pub stripe_webhook_secret: String,

    /// Stripe API base URL (stripe-mock in local runs)
    #[serde(default = "default_api_base_url")]
    pub stripe_api_base_url: String,

    /// Maximum age of a webhook signature timestamp
    #[serde(default = "default_tolerance")]
    pub webhook_tolerance_secs: i64,

    /// Reject test-mode events
    #[serde(default)]
    pub require_livemode: bool,

    /// Extra price ids for the Plus tier (comma-separated)
    pub plus_price_ids: Option<String>,

    /// Price ids for the Max tier (comma-separated)
    pub max_price_ids: Option<String>,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    pub fn api_key(&self) -> SecretString {
        SecretString::new(self.stripe_api_key.clone())
    }

    pub fn webhook_secret(&self) -> SecretString {
        SecretString::new(self.stripe_webhook_secret.clone())
    }

    pub fn plus_price_id_list(&self) -> Vec<String> {
        split_list(self.plus_price_ids.as_deref())
    }

    pub fn max_price_id_list(&self) -> Vec<String> {
        split_list(self.max_price_ids.as_deref())
    }

    /// Built-in price entries plus the configured lists.
    pub fn price_tier_table(&self) -> PriceTierTable {
        PriceTierTable::from_price_lists(self.plus_price_id_list(), self.max_price_id_list())
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("PAYMENT__STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYMENT__STRIPE_WEBHOOK_SECRET",
            ));
        }
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }
        if !self.stripe_api_base_url.starts_with("https://")
            && !self.stripe_api_base_url.starts_with("http://")
        {
            return Err(ValidationError::InvalidStripeApiUrl);
        }
        if self.webhook_tolerance_secs <= 0 || self.webhook_tolerance_secs > MAX_TOLERANCE_SECS {
            return Err(ValidationError::InvalidWebhookTolerance);
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            stripe_api_base_url: default_api_base_url(),
            webhook_tolerance_secs: default_tolerance(),
            require_livemode: false,
            plus_price_ids: None,
            max_price_ids: None,
        }
    }
}

fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_tolerance() -> i64 {
    DEFAULT_TOLERANCE_SECS
}
