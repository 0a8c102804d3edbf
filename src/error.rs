//! Error classification for backend calls.
//!
//! The backend reports failures in a handful of shapes; instead of probing
//! an opaque value's structure at every call site, the adapter boundary
//! (see [`crate::api`]) maps everything into this closed union, and the
//! primitives switch on its tags.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Machine-readable code marking an expired session.
///
/// Errors carrying this code are expected, not exceptional: they never
/// produce a user-facing notification.
pub const SESSION_EXPIRED: &str = "SESSION_EXPIRED";

/// The `detail` field of a structured backend error.
///
/// Either a plain message, or a list of validation-error objects whose
/// `msg` fields make up the message.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Text(String),
    Validation(Vec<Value>),
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorDetail::Text(text) => f.write_str(text),
            ErrorDetail::Validation(items) => {
                let rendered: Vec<String> = items
                    .iter()
                    .map(|item| {
                        item.get("msg")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| item.to_string())
                    })
                    .collect();
                f.write_str(&rendered.join(", "))
            }
        }
    }
}

/// Errors surfaced by backend calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Structured error body from the backend (`{detail, code}`).
    #[error("{detail}")]
    Api {
        detail: ErrorDetail,
        code: Option<String>,
    },

    /// Error carrying plain text.
    #[error("{0}")]
    Message(String),

    /// Connection-level failure from the HTTP client.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// Caller misuse. Fatal to the call and never notified; a programming
    /// error, not a runtime condition.
    #[error("{0}")]
    Config(String),

    /// An error value exposing nothing usable.
    #[error("An unknown error occurred")]
    Unknown,
}

impl ApiError {
    /// Normalized human-readable message for rendering.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether this error marks an expired session.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::Api { code: Some(code), .. } if code == SESSION_EXPIRED)
    }

    /// Whether a user-facing notification must be suppressed for this
    /// error regardless of caller configuration.
    pub fn suppress_notification(&self) -> bool {
        self.is_session_expired() || matches!(self, ApiError::Config(_))
    }

    /// The canonical expired-session error produced at the adapter
    /// boundary for unauthorized responses.
    pub fn session_expired() -> Self {
        ApiError::Api {
            detail: ErrorDetail::Text("Session expired. Please sign in again.".to_string()),
            code: Some(SESSION_EXPIRED.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_detail_message() {
        let err = ApiError::Api {
            detail: ErrorDetail::Text("Passport not found".to_string()),
            code: None,
        };
        assert_eq!(err.message(), "Passport not found");
    }

    #[test]
    fn test_validation_detail_joins_messages() {
        let err = ApiError::Api {
            detail: ErrorDetail::Validation(vec![json!({"msg": "X"}), json!({"msg": "Y"})]),
            code: None,
        };
        assert_eq!(err.message(), "X, Y");
    }

    #[test]
    fn test_validation_detail_without_msg_uses_string_form() {
        let err = ApiError::Api {
            detail: ErrorDetail::Validation(vec![json!({"loc": ["body", "name"]})]),
            code: None,
        };
        assert_eq!(err.message(), r#"{"loc":["body","name"]}"#);
    }

    #[test]
    fn test_unknown_has_fixed_message() {
        assert_eq!(ApiError::Unknown.message(), "An unknown error occurred");
    }

    #[test]
    fn test_session_expired_detection() {
        assert!(ApiError::session_expired().is_session_expired());
        assert!(ApiError::session_expired().suppress_notification());

        let other = ApiError::Api {
            detail: ErrorDetail::Text("denied".to_string()),
            code: Some("ACCESS_DENIED".to_string()),
        };
        assert!(!other.is_session_expired());
        assert!(!other.suppress_notification());
    }

    #[test]
    fn test_config_error_is_suppressed() {
        let err = ApiError::Config("operation is not callable".to_string());
        assert!(err.suppress_notification());
        assert!(!err.is_session_expired());
    }

    #[test]
    fn test_detail_deserializes_both_shapes() {
        let text: ErrorDetail = serde_json::from_str(r#""plain message""#).unwrap();
        assert!(matches!(text, ErrorDetail::Text(_)));

        let list: ErrorDetail = serde_json::from_str(r#"[{"msg": "bad"}]"#).unwrap();
        assert!(matches!(list, ErrorDetail::Validation(_)));
    }
}
