//! HTTP handlers for the webhook and health endpoints.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;

use crate::application::{HandleStripeWebhookCommand, HandleStripeWebhookHandler};
use crate::domain::subscription::WebhookError;

use super::dto::{ErrorResponse, HealthResponse, WebhookReceivedResponse};

pub const STRIPE_SIGNATURE_HEADER: &str = "Stripe-Signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for the billing routes.
#[derive(Clone)]
pub struct BillingAppState {
    pub webhook_handler: Arc<HandleStripeWebhookHandler>,
}

impl BillingAppState {
    pub fn new(webhook_handler: Arc<HandleStripeWebhookHandler>) -> Self {
        Self { webhook_handler }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/webhooks/stripe - Verify and reconcile a Stripe event
pub async fn handle_stripe_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let cmd = HandleStripeWebhookCommand {
        payload: body.to_vec(),
        signature,
    };

    let outcome = state.webhook_handler.handle(cmd).await?;
    tracing::debug!(outcome = ?outcome, "Webhook handled");

    Ok(Json(WebhookReceivedResponse::ok()))
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse::ok())
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts webhook errors to HTTP responses.
#[derive(Debug)]
pub struct WebhookApiError(WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.0.status_code();
        let message = if self.0.is_retryable() {
            tracing::error!(error = %self.0, "Webhook processing failed, Stripe will retry");
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorResponse::new(self.0.code(), message);
        (status, Json(body)).into_response()
    }
}
