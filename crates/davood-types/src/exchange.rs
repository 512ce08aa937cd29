//! Wire payload and outcome types for a backend exchange.

use serde::{Deserialize, Serialize};

use crate::chat::Message;

/// Body of the outbound POST.
///
/// `context` is omitted from the JSON entirely when absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<Message>>,
}

/// What the caller of `send` always receives: a renderable reply plus a
/// success flag. Failures carry the fault description and a fallback reply.
#[derive(Debug, Clone, Serialize)]
pub struct SendOutcome {
    pub success: bool,
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl SendOutcome {
    pub fn delivered(response: String, data: serde_json::Value) -> Self {
        Self {
            success: true,
            response,
            error: None,
            data: Some(data),
        }
    }

    pub fn fallback(error: String, response: String) -> Self {
        Self {
            success: false,
            response,
            error: Some(error),
            data: None,
        }
    }
}

/// Result of a reachability probe against the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionStatus {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub message: String,
}

impl ConnectionStatus {
    /// Probe answered with an HTTP status.
    pub fn from_status(status: u16) -> Self {
        let success = (200..300).contains(&status);
        Self {
            success,
            status: Some(status),
            message: if success {
                "Connection successful!".to_string()
            } else {
                "Connection failed!".to_string()
            },
        }
    }

    /// Probe never got a response.
    pub fn unreachable(fault: &str) -> Self {
        Self {
            success: false,
            status: None,
            message: format!("Connection failed: {fault}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_without_context_omits_field() {
        let req = ChatRequest {
            message: "hi".to_string(),
            timestamp: "2024-01-01T00:00:00.000Z".to_string(),
            context: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("context").is_none());
        assert_eq!(value["message"], "hi");
    }

    #[test]
    fn test_connection_status_messages() {
        assert_eq!(
            ConnectionStatus::from_status(204).message,
            "Connection successful!"
        );
        let failed = ConnectionStatus::from_status(404);
        assert!(!failed.success);
        assert_eq!(failed.status, Some(404));
        assert_eq!(failed.message, "Connection failed!");

        let down = ConnectionStatus::unreachable("connection refused");
        assert_eq!(down.status, None);
        assert_eq!(down.message, "Connection failed: connection refused");
    }

    #[test]
    fn test_fallback_outcome_serialization_skips_data() {
        let outcome = SendOutcome::fallback("boom".to_string(), "offline".to_string());
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "boom");
        assert!(value.get("data").is_none());
    }
}
