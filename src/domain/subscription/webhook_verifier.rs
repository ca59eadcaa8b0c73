//! Stripe webhook signature verification.
//!
//! Stripe signs `"{t}.{raw body}"` with HMAC-SHA256 using the endpoint's
//! signing secret and sends the result in the `Stripe-Signature` header.
//! The header timestamp is checked against a tolerance window to prevent
//! replays of captured deliveries.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::stripe_event::StripeEvent;
use super::webhook_errors::WebhookError;

/// Default maximum age of a signature (5 minutes), Stripe's own default.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Maximum allowed clock skew for future timestamps (1 minute).
const MAX_CLOCK_SKEW_SECS: i64 = 60;

type HmacSha256 = Hmac<Sha256>;

/// Decoded `Stripe-Signature` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// `t=`, Unix seconds at signing time.
    pub timestamp: i64,
    /// v1 signatures. Stripe sends more than one while a secret is being rolled.
    pub v1_signatures: Vec<Vec<u8>>,
}

impl SignatureHeader {
    /// Format: `t=<timestamp>,v1=<signature>[,v1=<signature>...][,v0=<legacy>]`
    ///
    /// Malformed headers are `ParseError`.
    pub fn parse(header: &str) -> Result<Self, WebhookError> {
        let mut timestamp = None;
        let mut v1_signatures = Vec::new();

        for part in header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                return Err(WebhookError::ParseError(format!(
                    "malformed header entry '{}'",
                    part.trim()
                )));
            };

            match key {
                "t" => {
                    let parsed: i64 = value.parse().map_err(|_| {
                        WebhookError::ParseError(format!("timestamp '{}' is not a number", value))
                    })?;
                    timestamp = Some(parsed);
                }
                "v1" => {
                    v1_signatures.push(hex::decode(value).map_err(|_| {
                        WebhookError::ParseError("invalid v1 signature hex".to_string())
                    })?);
                }
                // v0 is Stripe's legacy test scheme and never trusted
                _ => {}
            }
        }

        let Some(timestamp) = timestamp else {
            return Err(WebhookError::ParseError("no t= entry".to_string()));
        };
        if v1_signatures.is_empty() {
            return Err(WebhookError::ParseError("no v1= entry".to_string()));
        }

        Ok(Self {
            timestamp,
            v1_signatures,
        })
    }
}

/// Checks deliveries against the endpoint signing secret.
pub struct StripeWebhookVerifier {
    secret: SecretString,
    tolerance_secs: i64,
    require_livemode: bool,
}

impl StripeWebhookVerifier {
    /// Creates a verifier with the default tolerance that accepts test-mode events.
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            require_livemode: false,
        }
    }

    /// Overrides the maximum signature age.
    pub fn with_tolerance_secs(mut self, tolerance_secs: i64) -> Self {
        self.tolerance_secs = tolerance_secs;
        self
    }

    /// Rejects events whose `livemode` flag is false.
    pub fn with_require_livemode(mut self, require_livemode: bool) -> Self {
        self.require_livemode = require_livemode;
        self
    }

    /// Authenticates a delivery, then parses its envelope.
    ///
    /// The payload must be the exact bytes received on the wire.
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` - no v1 signature matched
    /// - `TimestampOutOfRange` - signature older than the tolerance
    /// - `InvalidTimestamp` - signature timestamp is in the future
    /// - `LivemodeMismatch` - test event while live events are required
    /// - `ParseError` - header or JSON envelope could not be parsed
    pub fn verify_and_parse(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent, WebhookError> {
        let header = SignatureHeader::parse(signature_header)?;

        self.validate_timestamp(header.timestamp, chrono::Utc::now().timestamp())?;

        let expected = compute_signature(self.secret.expose_secret(), header.timestamp, payload)
            .ok_or(WebhookError::InvalidSignature)?;

        let matched = header
            .v1_signatures
            .iter()
            .any(|candidate| constant_time_compare(&expected, candidate));
        if !matched {
            return Err(WebhookError::InvalidSignature);
        }

        let event = serde_json::from_slice::<StripeEvent>(payload)
            .map_err(|e| WebhookError::ParseError(format!("event envelope: {}", e)))?;

        if self.require_livemode && !event.livemode {
            return Err(WebhookError::LivemodeMismatch);
        }

        Ok(event)
    }

    fn validate_timestamp(&self, signed_at: i64, now: i64) -> Result<(), WebhookError> {
        // `t=` is attacker-controlled until the signature is checked.
        match now.checked_sub(signed_at) {
            None => Err(WebhookError::InvalidTimestamp),
            Some(age) if age > self.tolerance_secs => Err(WebhookError::TimestampOutOfRange),
            Some(age) if age < -MAX_CLOCK_SKEW_SECS => Err(WebhookError::InvalidTimestamp),
            Some(_) => Ok(()),
        }
    }
}

/// HMAC-SHA256 over `"{timestamp}.{payload}"`.
fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Some(mac.finalize().into_bytes().to_vec())
}

fn constant_time_compare(expected: &[u8], candidate: &[u8]) -> bool {
    expected.len() == candidate.len() && bool::from(expected.ct_eq(candidate))
}

/// Builds a valid `Stripe-Signature` header for a payload.
///
/// Mirrors the test-header helper in Stripe's official libraries; used by
/// integration tests and local replay tooling.
pub fn generate_test_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let signature = compute_signature(secret, timestamp, payload)
        .map(hex::encode)
        .unwrap_or_default();
    format!("t={},v1={}", timestamp, signature)
}
