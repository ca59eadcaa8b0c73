//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresSubscriptionRepository` - the `user_subscriptions` table

mod subscription_repository;

pub use subscription_repository::PostgresSubscriptionRepository;
