//! HandleStripeWebhookHandler - verifies a Stripe delivery and dispatches it.
//!
//! Only signature problems and storage failures are errors. Everything
//! else (unknown types, malformed objects, records that do not exist)
//! is logged and acknowledged so Stripe stops redelivering.

use std::sync::Arc;

use crate::domain::foundation::UserId;
use crate::domain::subscription::{
    StripeCheckoutSession, StripeEvent, StripeEventType, StripeInvoice, StripeSubscription,
    StripeWebhookVerifier, SubscriptionStatus, SubscriptionTier, WebhookError,
};

use super::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
    LinkCheckoutCommand, LinkCheckoutHandler, LinkCheckoutResult, SyncSubscriptionCommand,
    SyncSubscriptionHandler, SyncSubscriptionResult,
};

/// Command to handle one webhook delivery.
#[derive(Debug, Clone)]
pub struct HandleStripeWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value, if the request carried one.
    pub signature: Option<String>,
}

/// What the delivery led to. Every variant is acknowledged with 200.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    SubscriptionSynced {
        user_id: UserId,
        tier: SubscriptionTier,
        status: SubscriptionStatus,
    },
    SubscriptionCanceled {
        user_id: UserId,
    },
    CheckoutLinked {
        user_id: UserId,
        subscription_synced: bool,
    },
    /// Recognized event that led to no write.
    Skipped {
        reason: String,
    },
    /// Invoice events are recorded in the log only.
    InvoiceLogged,
    /// Event type the reconciler does not act on.
    Acknowledged,
}

pub struct HandleStripeWebhookHandler {
    verifier: Arc<StripeWebhookVerifier>,
    sync: Arc<SyncSubscriptionHandler>,
    cancel: Arc<CancelSubscriptionHandler>,
    checkout: Arc<LinkCheckoutHandler>,
}

impl HandleStripeWebhookHandler {
    pub fn new(
        verifier: Arc<StripeWebhookVerifier>,
        sync: Arc<SyncSubscriptionHandler>,
        cancel: Arc<CancelSubscriptionHandler>,
        checkout: Arc<LinkCheckoutHandler>,
    ) -> Self {
        Self {
            verifier,
            sync,
            cancel,
            checkout,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandleStripeWebhookCommand,
    ) -> Result<WebhookOutcome, WebhookError> {
        let signature = cmd
            .signature
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                tracing::warn!("Webhook rejected: missing Stripe-Signature header");
                WebhookError::MissingSignature
            })?;

        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, signature)
            .map_err(|e| {
                tracing::warn!(error = %e, "Webhook rejected: verification failed");
                e
            })?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Stripe event received"
        );

        match event.parsed_type() {
            StripeEventType::CustomerSubscriptionCreated
            | StripeEventType::CustomerSubscriptionUpdated => {
                self.on_subscription_changed(&event).await
            }
            StripeEventType::CustomerSubscriptionDeleted => {
                self.on_subscription_deleted(&event).await
            }
            StripeEventType::CheckoutSessionCompleted => self.on_checkout_completed(&event).await,
            StripeEventType::InvoicePaymentSucceeded | StripeEventType::InvoicePaymentFailed => {
                Ok(self.on_invoice(&event))
            }
            StripeEventType::Other => {
                tracing::debug!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    "Unhandled event type acknowledged"
                );
                Ok(WebhookOutcome::Acknowledged)
            }
        }
    }

    async fn on_subscription_changed(
        &self,
        event: &StripeEvent,
    ) -> Result<WebhookOutcome, WebhookError> {
        let subscription = match event.deserialize_object::<StripeSubscription>() {
            Ok(subscription) => subscription,
            Err(e) => return Ok(malformed(event, e)),
        };

        let result = self
            .sync
            .handle(SyncSubscriptionCommand { subscription })
            .await?;

        Ok(match result {
            SyncSubscriptionResult::Synced {
                user_id,
                tier,
                status,
            } => WebhookOutcome::SubscriptionSynced {
                user_id,
                tier,
                status,
            },
            SyncSubscriptionResult::NoMatchingRecord { customer_id } => WebhookOutcome::Skipped {
                reason: format!("no subscription record for customer {}", customer_id),
            },
        })
    }

    async fn on_subscription_deleted(
        &self,
        event: &StripeEvent,
    ) -> Result<WebhookOutcome, WebhookError> {
        let subscription = match event.deserialize_object::<StripeSubscription>() {
            Ok(subscription) => subscription,
            Err(e) => return Ok(malformed(event, e)),
        };

        let result = self
            .cancel
            .handle(CancelSubscriptionCommand {
                subscription_id: subscription.id,
            })
            .await?;

        Ok(match result {
            CancelSubscriptionResult::Canceled { user_id } => {
                WebhookOutcome::SubscriptionCanceled { user_id }
            }
            CancelSubscriptionResult::NoMatchingRecord { subscription_id } => {
                WebhookOutcome::Skipped {
                    reason: format!("no subscription record for {}", subscription_id),
                }
            }
        })
    }

    async fn on_checkout_completed(
        &self,
        event: &StripeEvent,
    ) -> Result<WebhookOutcome, WebhookError> {
        let session = match event.deserialize_object::<StripeCheckoutSession>() {
            Ok(session) => session,
            Err(e) => return Ok(malformed(event, e)),
        };

        let result = self.checkout.handle(LinkCheckoutCommand { session }).await?;

        Ok(match result {
            LinkCheckoutResult::Linked {
                user_id,
                subscription_synced,
            } => WebhookOutcome::CheckoutLinked {
                user_id,
                subscription_synced,
            },
            LinkCheckoutResult::Skipped { reason } => WebhookOutcome::Skipped { reason },
            LinkCheckoutResult::NoMatchingRecord { user_id } => WebhookOutcome::Skipped {
                reason: format!("no subscription record for user {}", user_id),
            },
        })
    }

    fn on_invoice(&self, event: &StripeEvent) -> WebhookOutcome {
        match event.deserialize_object::<StripeInvoice>() {
            Ok(invoice) => {
                tracing::info!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    invoice_id = %invoice.id,
                    customer_id = ?invoice.customer,
                    subscription_id = ?invoice.subscription,
                    amount_paid = invoice.amount_paid,
                    amount_due = invoice.amount_due,
                    attempt_count = invoice.attempt_count,
                    "Invoice event logged"
                );
            }
            Err(e) => {
                tracing::warn!(event_id = %event.id, error = %e, "Malformed invoice object");
            }
        }
        WebhookOutcome::InvoiceLogged
    }
}

fn malformed(event: &StripeEvent, error: serde_json::Error) -> WebhookOutcome {
    tracing::warn!(
        event_id = %event.id,
        event_type = %event.event_type,
        error = %error,
        "Malformed event object, acknowledging without changes"
    );
    WebhookOutcome::Skipped {
        reason: format!("malformed {} object: {}", event.event_type, error),
    }
}
