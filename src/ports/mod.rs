//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SubscriptionRepository` - the `user_subscriptions` table
//! - `PaymentProvider` - Stripe API reads
//! - `CacheInvalidator` - downstream cache busting

mod cache_invalidator;
mod payment_provider;
mod subscription_repository;

pub use cache_invalidator::{CacheInvalidator, CacheType};
pub use payment_provider::{PaymentError, PaymentErrorCode, PaymentProvider};
pub use subscription_repository::SubscriptionRepository;
