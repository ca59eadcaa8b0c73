//! Response bodies for the webhook endpoint.

use serde::{Deserialize, Serialize};

/// Acknowledgement returned for every accepted delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookReceivedResponse {
    pub received: bool,
}

impl WebhookReceivedResponse {
    pub fn ok() -> Self {
        Self { received: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// Standard error body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn received_response_serializes_flag() {
        let json = serde_json::to_string(&WebhookReceivedResponse::ok()).unwrap();
        assert_eq!(json, r#"{"received":true}"#);
    }

    #[test]
    fn health_response_serializes_status() {
        let json = serde_json::to_string(&HealthResponse::ok()).unwrap();
        assert_eq!(json, r#"{"status":"ok"}"#);
    }

    #[test]
    fn error_response_uses_code_and_message() {
        let json = serde_json::to_value(ErrorResponse::new("MISSING_SIGNATURE", "no header"))
            .unwrap();
        assert_eq!(json["code"], "MISSING_SIGNATURE");
        assert_eq!(json["message"], "no header");
    }
}
