//! Mock payment provider for testing.
//!
//! Configurable `PaymentProvider` for unit and integration tests with
//! pre-seeded subscriptions, error injection and call tracking.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::subscription::StripeSubscription;
use crate::ports::{PaymentError, PaymentProvider};

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
/// mock.add_subscription(subscription);
/// mock.set_error(PaymentError::network("connection reset"));
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    subscriptions: HashMap<String, StripeSubscription>,

    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Track requested subscription ids for assertions.
    call_log: Vec<String>,
}

impl MockPaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Add a subscription to the "API".
    pub fn add_subscription(&self, subscription: StripeSubscription) {
        let id = subscription.id.clone();
        self.state().subscriptions.insert(id, subscription);
    }

    /// Set an error to return on the next call.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Call Tracking
    // ════════════════════════════════════════════════════════════════════════════

    /// Subscription ids requested so far, in order.
    pub fn requested_subscriptions(&self) -> Vec<String> {
        self.state().call_log.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().call_log.len()
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn get_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<Option<StripeSubscription>, PaymentError> {
        let mut state = self.state();
        state.call_log.push(subscription_id.to_string());

        if let Some(error) = state.next_error.take() {
            return Err(error);
        }

        Ok(state.subscriptions.get(subscription_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PaymentErrorCode;

    fn subscription(id: &str) -> StripeSubscription {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "customer": "cus_1",
            "status": "active"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn returns_seeded_subscription() {
        let mock = MockPaymentProvider::new();
        mock.add_subscription(subscription("sub_1"));

        let found = mock.get_subscription("sub_1").await.unwrap();

        assert_eq!(found.unwrap().id, "sub_1");
        assert_eq!(mock.requested_subscriptions(), vec!["sub_1".to_string()]);
    }

    #[tokio::test]
    async fn unknown_subscription_is_none() {
        let mock = MockPaymentProvider::new();
        assert!(mock.get_subscription("sub_missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn injected_error_is_consumed_once() {
        let mock = MockPaymentProvider::new();
        mock.add_subscription(subscription("sub_1"));
        mock.set_error(PaymentError::network("reset"));

        let err = mock.get_subscription("sub_1").await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::NetworkError);

        assert!(mock.get_subscription("sub_1").await.unwrap().is_some());
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let mock = MockPaymentProvider::new();
        let clone = mock.clone();
        clone.add_subscription(subscription("sub_2"));

        assert!(mock.get_subscription("sub_2").await.unwrap().is_some());
    }
}
