//! Client error types

use crate::client::transport::TransportError;
use gstpro_core::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Location prefixes the server puts in front of field paths
const LOCATION_SEGMENTS: [&str; 5] = ["body", "query", "path", "header", "cookie"];

/// Why a request was dropped before reaching the network
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CancelReason {
    /// The stored token could not be decoded
    TokenInvalid(String),
    /// The stored token's expiry has passed
    TokenExpired,
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenInvalid(reason) => write!(f, "stored token is invalid ({reason})"),
            Self::TokenExpired => write!(f, "stored token has expired"),
        }
    }
}

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Dropped locally because the session is no longer usable; never shown to the user
    #[error("Request cancelled: {0}")]
    RequestCancelled(CancelReason),

    /// Server rejected the credentials (401)
    #[error("Session expired: {0}")]
    SessionExpired(String),

    /// Server-side validation failed (422)
    #[error("Validation failed: {message}")]
    ValidationFailed {
        detail: Option<ErrorDetail>,
        message: String,
    },

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Server returned a 5xx status
    #[error("Server error {status}: {message}")]
    ServerFault { status: u16, message: String },

    /// No response was received
    #[error("Network unreachable: {0}")]
    NetworkUnreachable(#[source] TransportError),

    /// Any other error status
    #[error("Request rejected {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Payload failed local validation and was not sent
    #[error("Invalid input:\n{0}")]
    InvalidInput(#[from] ValidationErrors),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Persisted session state could not be read or written
    #[error("Session storage error: {0}")]
    Storage(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from an HTTP status code and the raw response body
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let detail = ErrorBody::parse(body);
        let message = detail.as_ref().map(ErrorDetail::message).unwrap_or_default();

        match status {
            401 => Self::SessionExpired(non_empty_or(message, "Could not validate credentials")),
            404 => Self::NotFound(non_empty_or(message, "The requested resource was not found")),
            422 => Self::ValidationFailed {
                message: non_empty_or(message, "Validation failed"),
                detail,
            },
            500.. => Self::ServerFault {
                status,
                message: non_empty_or(message, "Internal server error"),
            },
            _ => Self::Rejected {
                status,
                message: non_empty_or(message, &format!("Request failed with status {status}")),
            },
        }
    }

    /// HTTP status carried by this error, if the server responded
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::SessionExpired(_) => Some(401),
            Self::NotFound(_) => Some(404),
            Self::ValidationFailed { .. } => Some(422),
            Self::ServerFault { status, .. } | Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this error ended the session (locally or by the server)
    pub fn is_session_error(&self) -> bool {
        matches!(self, Self::SessionExpired(_) | Self::RequestCancelled(_))
    }

    /// Whether the request was dropped before it was sent
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::RequestCancelled(_))
    }

    /// Field-level issues from a 422, for form-level handling
    pub fn field_issues(&self) -> &[FieldIssue] {
        match self {
            Self::ValidationFailed {
                detail: Some(ErrorDetail::Fields(issues)),
                ..
            } => issues,
            _ => &[],
        }
    }
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

/// Error envelope returned by the API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<ErrorDetail>,
}

impl ErrorBody {
    /// Extract the detail; non-JSON bodies are used verbatim
    fn parse(body: &[u8]) -> Option<ErrorDetail> {
        if body.is_empty() {
            return None;
        }
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(parsed) => parsed.detail,
            Err(_) => {
                let text = String::from_utf8_lossy(body).trim().to_string();
                (!text.is_empty()).then_some(ErrorDetail::Message(text))
            }
        }
    }
}

/// Server-provided error detail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldIssue>),
    Other(JsonValue),
}

impl ErrorDetail {
    /// Human-readable message; field issues become one `field: msg` line each
    pub fn message(&self) -> String {
        match self {
            Self::Message(message) => message.clone(),
            Self::Fields(issues) => issues
                .iter()
                .map(FieldIssue::line)
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Other(value) => value.to_string(),
        }
    }
}

/// One entry of a 422 detail list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldIssue {
    #[serde(default)]
    pub loc: Vec<JsonValue>,
    pub msg: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl FieldIssue {
    /// Dotted field path without the leading location segment
    pub fn field(&self) -> String {
        let mut segments = self.loc.iter().map(|segment| match segment {
            JsonValue::String(s) => s.clone(),
            other => other.to_string(),
        });
        let mut parts: Vec<String> = Vec::with_capacity(self.loc.len());
        if let Some(first) = segments.next() {
            if !LOCATION_SEGMENTS.contains(&first.as_str()) {
                parts.push(first);
            }
        }
        parts.extend(segments);
        parts.join(".")
    }

    fn line(&self) -> String {
        let field = self.field();
        if field.is_empty() {
            self.msg.clone()
        } else {
            format!("{field}: {}", self.msg)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: JsonValue) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_from_status_classification() {
        assert!(matches!(
            ClientError::from_response(401, b""),
            ClientError::SessionExpired(_)
        ));
        assert!(matches!(
            ClientError::from_response(404, &body(json!({"detail": "Invoice not found"}))),
            ClientError::NotFound(ref m) if m == "Invoice not found"
        ));
        assert!(matches!(
            ClientError::from_response(503, b"upstream down"),
            ClientError::ServerFault { status: 503, .. }
        ));
        assert!(matches!(
            ClientError::from_response(409, b""),
            ClientError::Rejected { status: 409, ref message } if message == "Request failed with status 409"
        ));
    }

    #[test]
    fn test_server_fault_without_detail() {
        let err = ClientError::from_response(500, b"");
        assert_eq!(err.to_string(), "Server error 500: Internal server error");

        let err = ClientError::from_response(502, b"upstream down");
        assert_eq!(err.to_string(), "Server error 502: upstream down");
    }

    #[test]
    fn test_validation_list_becomes_lines() {
        let err = ClientError::from_response(
            422,
            &body(json!({"detail": [
                {"loc": ["body", "phone"], "msg": "ensure this value has at least 10 characters", "type": "value_error"},
                {"loc": ["body", "items", 0, "quantity"], "msg": "must be greater than 0"}
            ]})),
        );
        match &err {
            ClientError::ValidationFailed { message, .. } => assert_eq!(
                message,
                "phone: ensure this value has at least 10 characters\nitems.0.quantity: must be greater than 0"
            ),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(err.field_issues().len(), 2);
        assert_eq!(err.field_issues()[1].field(), "items.0.quantity");
    }

    #[test]
    fn test_validation_string_detail() {
        let err = ClientError::from_response(422, &body(json!({"detail": "GSTIN format is invalid"})));
        assert!(matches!(
            err,
            ClientError::ValidationFailed { ref message, .. } if message == "GSTIN format is invalid"
        ));
        assert!(err.field_issues().is_empty());
    }

    #[test]
    fn test_field_without_location_prefix() {
        let issue = FieldIssue {
            loc: vec![json!("email")],
            msg: "invalid".into(),
            kind: None,
        };
        assert_eq!(issue.field(), "email");
    }

    #[test]
    fn test_session_predicates() {
        assert!(ClientError::SessionExpired("x".into()).is_session_error());
        assert!(ClientError::RequestCancelled(CancelReason::TokenExpired).is_cancelled());
        assert!(!ClientError::NotFound("x".into()).is_session_error());
        assert_eq!(ClientError::from_response(422, b"").status(), Some(422));
    }
}
