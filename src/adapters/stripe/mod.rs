//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port against the Stripe REST API.
//! Secrets are handled via `secrecy::SecretString`.
//!
//! # Configuration
//!
//! - `EXAMRIZZ_BILLING__PAYMENT__STRIPE_API_KEY`: Stripe secret API key
//! - `EXAMRIZZ_BILLING__PAYMENT__STRIPE_API_BASE_URL`: override for stripe-mock

mod mock_payment_provider;
mod stripe_adapter;

pub use mock_payment_provider::MockPaymentProvider;
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
