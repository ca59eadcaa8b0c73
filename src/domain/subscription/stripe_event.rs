//! Stripe webhook event envelope.
//!
//! Only the fields the reconciler reads are captured; everything else in
//! Stripe's event schema is ignored during deserialization.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One delivery from `POST /api/webhooks/stripe`, after verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEvent {
    /// `evt_...`
    pub id: String,

    /// Raw type string, e.g. `customer.subscription.updated`.
    #[serde(rename = "type")]
    pub event_type: String,

    /// Unix seconds. Zero when Stripe omits it.
    #[serde(default)]
    pub created: i64,

    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,

    /// Null for some account-level events.
    #[serde(default)]
    pub api_version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeEventData {
    /// Subscription, checkout session or invoice, depending on the type.
    pub object: Value,

    /// Present on `*.updated` events only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_attributes: Option<Value>,
}

impl StripeEvent {
    /// Reads `data.object` as a typed Stripe object.
    pub fn deserialize_object<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data.object)
    }

    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::parse(&self.event_type)
    }
}

/// Event types the dispatcher distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    CustomerSubscriptionCreated,
    CustomerSubscriptionUpdated,
    CustomerSubscriptionDeleted,
    CheckoutSessionCompleted,
    InvoicePaymentSucceeded,
    InvoicePaymentFailed,
    /// Anything else Stripe sends; acknowledged without action.
    Other,
}

const HANDLED_TYPES: [(&str, StripeEventType); 6] = [
    ("customer.subscription.created", StripeEventType::CustomerSubscriptionCreated),
    ("customer.subscription.updated", StripeEventType::CustomerSubscriptionUpdated),
    ("customer.subscription.deleted", StripeEventType::CustomerSubscriptionDeleted),
    ("checkout.session.completed", StripeEventType::CheckoutSessionCompleted),
    ("invoice.payment_succeeded", StripeEventType::InvoicePaymentSucceeded),
    ("invoice.payment_failed", StripeEventType::InvoicePaymentFailed),
];

impl StripeEventType {
    pub fn parse(raw: &str) -> Self {
        HANDLED_TYPES
            .iter()
            .find(|(name, _)| *name == raw)
            .map(|(_, kind)| *kind)
            .unwrap_or(Self::Other)
    }

    pub fn as_str(&self) -> &'static str {
        HANDLED_TYPES
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(name, _)| *name)
            .unwrap_or("other")
    }
}

impl std::fmt::Display for StripeEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Test fixture for events that skip the signature step.
#[cfg(test)]
pub struct StripeEventBuilder {
    event: StripeEvent,
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self {
            event: StripeEvent {
                id: "evt_fixture".to_string(),
                event_type: "customer.subscription.updated".to_string(),
                created: 1_702_000_000,
                data: StripeEventData {
                    object: Value::Object(Default::default()),
                    previous_attributes: None,
                },
                livemode: false,
                api_version: Some("2024-06-20".to_string()),
            },
        }
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: Value) -> Self {
        self.event.data.object = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        self.event
    }
}
