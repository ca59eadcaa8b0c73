//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `cache` - Platform cache invalidation (HTTP, no-op, recording)
//! - `http` - Axum routes for the webhook and health endpoints
//! - `memory` - In-memory repository for tests and local runs
//! - `postgres` - PostgreSQL repository
//! - `stripe` - Stripe REST API client and mock

pub mod cache;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
