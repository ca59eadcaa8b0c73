//! Billing handlers.
//!
//! ## Commands
//! - Handling a Stripe webhook delivery (verification + dispatch)
//! - Syncing a subscription snapshot onto a user's record
//! - Downgrading a user whose subscription was deleted
//! - Linking a completed checkout to a user

mod cancel_subscription;
mod handle_stripe_webhook;
mod link_checkout;
mod sync_subscription;

pub use cancel_subscription::{
    CancelSubscriptionCommand, CancelSubscriptionHandler, CancelSubscriptionResult,
};
pub use handle_stripe_webhook::{
    HandleStripeWebhookCommand, HandleStripeWebhookHandler, WebhookOutcome,
};
pub use link_checkout::{LinkCheckoutCommand, LinkCheckoutHandler, LinkCheckoutResult};
pub use sync_subscription::{
    SyncSubscriptionCommand, SyncSubscriptionHandler, SyncSubscriptionResult,
};
