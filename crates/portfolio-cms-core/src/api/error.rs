use serde::Deserialize;
use thiserror::Error;

use crate::models::ValidationError;

/// Errors surfaced by the request gateway.
///
/// Every non-2xx response is decoded exactly once, here, into a variant that
/// carries the server's `message` field when one was sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{}", .message.as_deref().unwrap_or("Unauthorized - token may be invalid or expired"))]
    Unauthorized { message: Option<String> },

    #[error("{}", .message.as_deref().unwrap_or("Access denied"))]
    Forbidden { message: Option<String> },

    #[error("{}", .message.as_deref().unwrap_or("Resource not found"))]
    NotFound { message: Option<String> },

    #[error("{}", .message.as_deref().unwrap_or("Request rejected"))]
    Rejected { status: u16, message: Option<String> },

    #[error("{}", .message.as_deref().unwrap_or("Server error"))]
    ServerError { status: u16, message: Option<String> },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Input rejected locally; nothing was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Maximum length for error response bodies kept in `InvalidResponse` messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// The only shape the API uses for error bodies
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", cut, body.len())
        }
    }

    /// Extract `message` from a JSON error body. Blank messages count as absent.
    fn decode_message(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }

    pub fn from_status(status: u16, body: &str) -> Self {
        let message = Self::decode_message(body);
        match status {
            401 => ApiError::Unauthorized { message },
            403 => ApiError::Forbidden { message },
            404 => ApiError::NotFound { message },
            500..=599 => ApiError::ServerError { status, message },
            _ => ApiError::Rejected { status, message },
        }
    }

    /// The message the server sent with the failure, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message }
            | ApiError::Forbidden { message }
            | ApiError::NotFound { message }
            | ApiError::Rejected { message, .. }
            | ApiError::ServerError { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// Server message if present, otherwise the caller's fallback
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    /// True when the server answered (as opposed to the request never completing)
    pub fn is_response(&self) -> bool {
        !matches!(
            self,
            ApiError::Network(_)
                | ApiError::Timeout(_)
                | ApiError::InvalidRequest(_)
                | ApiError::Validation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_decodes_server_message() {
        let err = ApiError::from_status(401, r#"{"message":"Invalid credentials"}"#);
        assert_eq!(
            err,
            ApiError::Unauthorized {
                message: Some("Invalid credentials".to_string())
            }
        );
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.message_or("Login failed."), "Invalid credentials");
    }

    #[test]
    fn test_from_status_without_message_uses_fallback() {
        let err = ApiError::from_status(500, "<html>Bad Gateway</html>");
        assert_eq!(err.server_message(), None);
        assert_eq!(err.message_or("Login failed."), "Login failed.");

        let err = ApiError::from_status(400, r#"{"message":"   "}"#);
        assert_eq!(err.server_message(), None);
    }

    #[test]
    fn test_from_status_mapping() {
        assert!(matches!(ApiError::from_status(403, ""), ApiError::Forbidden { .. }));
        assert!(matches!(ApiError::from_status(404, ""), ApiError::NotFound { .. }));
        assert!(matches!(
            ApiError::from_status(422, ""),
            ApiError::Rejected { status: 422, .. }
        ));
        assert!(matches!(
            ApiError::from_status(503, ""),
            ApiError::ServerError { status: 503, .. }
        ));
    }

    #[test]
    fn test_is_response() {
        assert!(ApiError::from_status(401, "").is_response());
        assert!(!ApiError::Network("connection refused".into()).is_response());
        assert!(!ApiError::Timeout(30).is_response());
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(600);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(500)));
        assert!(truncated.ends_with("(truncated, 600 total bytes)"));
        assert_eq!(ApiError::truncate_body("short"), "short");
    }
}
