//! Cache invalidation adapters.
//!
//! - `HttpCacheInvalidator` - production, spawn-and-detach HTTP POST
//! - `NoopCacheInvalidator` - no endpoint configured
//! - `RecordingCacheInvalidator` - captures calls for tests

mod http_invalidator;
mod noop_invalidator;
mod recording_invalidator;

pub use http_invalidator::{HttpCacheInvalidator, InvalidationRequest};
pub use noop_invalidator::NoopCacheInvalidator;
pub use recording_invalidator::{InvalidationCall, RecordingCacheInvalidator};
