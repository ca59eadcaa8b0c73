//! HTTP adapter for Stripe webhook deliveries.
//!
//! - `POST /api/webhooks/stripe` - Verify and reconcile a Stripe event
//!
//! The route carries no user authentication; the `Stripe-Signature`
//! header is the only credential.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use dto::{ErrorResponse, HealthResponse, WebhookReceivedResponse};
pub use handlers::{handle_stripe_webhook, health, BillingAppState, WebhookApiError};
pub use routes::{billing_router, webhook_routes};
