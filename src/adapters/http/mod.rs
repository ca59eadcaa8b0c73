//! HTTP adapters - REST API implementations.

pub mod webhooks;

pub use webhooks::{billing_router, BillingAppState};
