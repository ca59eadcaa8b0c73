//! Axum router configuration for the billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{handle_stripe_webhook, health, BillingAppState};

/// Create the Stripe webhook router.
///
/// # Routes
/// - `POST /stripe` - Handle Stripe webhooks
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/stripe", post(handle_stripe_webhook))
}

/// Create the complete billing router.
///
/// # Example
///
/// ```ignore
/// let app = billing_router().with_state(BillingAppState::new(handler));
/// ```
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/webhooks", webhook_routes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapters::cache::RecordingCacheInvalidator;
    use crate::adapters::memory::InMemorySubscriptionRepository;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::application::handlers::billing::{
        CancelSubscriptionHandler, HandleStripeWebhookHandler, LinkCheckoutHandler,
        SyncSubscriptionHandler,
    };
    use crate::domain::subscription::{PriceTierTable, StripeWebhookVerifier};
    use secrecy::SecretString;

    fn test_state() -> BillingAppState {
        let repo = Arc::new(InMemorySubscriptionRepository::new());
        let cache = Arc::new(RecordingCacheInvalidator::default());
        let provider = Arc::new(MockPaymentProvider::default());
        let sync = Arc::new(SyncSubscriptionHandler::new(
            repo.clone(),
            cache.clone(),
            Arc::new(PriceTierTable::default()),
        ));
        let cancel = Arc::new(CancelSubscriptionHandler::new(repo.clone(), cache.clone()));
        let checkout = Arc::new(LinkCheckoutHandler::new(
            repo,
            provider,
            sync.clone(),
            cache,
        ));
        let verifier = Arc::new(StripeWebhookVerifier::new(SecretString::new(
            "whsec_test".to_string(),
        )));

        BillingAppState::new(Arc::new(HandleStripeWebhookHandler::new(
            verifier, sync, cancel, checkout,
        )))
    }

    #[test]
    fn webhook_routes_creates_router() {
        let _: Router<()> = webhook_routes().with_state(test_state());
    }

    #[test]
    fn billing_router_creates_combined_router() {
        let _: Router<()> = billing_router().with_state(test_state());
    }
}
