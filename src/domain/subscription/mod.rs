//! Subscription domain module.
//!
//! Mirrors Stripe subscription state into the per-user subscription record.
//!
//! # Module Structure
//!
//! - `tier` - SubscriptionTier and the price-to-tier lookup
//! - `status` - SubscriptionStatus (Stripe's vocabulary)
//! - `record` - SubscriptionRecord and the snapshot applied to it
//! - `stripe_event` / `stripe_objects` - webhook payload types
//! - `webhook_verifier` - Stripe-Signature verification
//! - `webhook_errors` - ingress error taxonomy

mod record;
mod status;
mod stripe_event;
mod stripe_objects;
mod tier;
mod webhook_errors;
mod webhook_verifier;

pub use record::{SubscriptionRecord, SubscriptionSnapshot};
pub use status::SubscriptionStatus;
#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
pub use stripe_event::{StripeEvent, StripeEventData, StripeEventType};
pub use stripe_objects::{
    StripeCheckoutSession, StripeInvoice, StripePrice, StripeSubscription, StripeSubscriptionItem,
    StripeSubscriptionItems,
};
pub use tier::{PriceTierTable, SubscriptionTier, PLUS_MONTHLY_PRICE_ID};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{
    generate_test_header, SignatureHeader, StripeWebhookVerifier, DEFAULT_TOLERANCE_SECS,
};
