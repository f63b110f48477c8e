use thiserror::Error;

use crate::api::ApiError;

/// Shown when a login rejection carries no usable message
pub const LOGIN_FAILED: &str = "Login failed.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The server answered and refused
    #[error("{0}")]
    Authentication(String),

    /// No usable answer reached us
    #[error("{0}")]
    Network(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Api(ApiError),
}

impl AuthError {
    /// Map a failed login request: server message when present, fixed fallback otherwise
    pub fn from_login(error: ApiError) -> Self {
        if error.is_response() {
            AuthError::Authentication(error.message_or(LOGIN_FAILED))
        } else {
            AuthError::Network(error.to_string())
        }
    }
}
