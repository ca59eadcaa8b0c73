//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `subscription` - Stripe events, signature verification and the subscription record

pub mod foundation;
pub mod subscription;
