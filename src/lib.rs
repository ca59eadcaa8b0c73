//! examrizz billing - Stripe webhook subscription reconciler
//!
//! Receives signed Stripe webhook deliveries and keeps each user's
//! subscription record (tier, status, billing period) in step with Stripe.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
