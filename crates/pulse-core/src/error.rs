//! Domain errors

use pulse_security::TokenError;
use pulse_shared::constants::{LOGIN_FAILED_MESSAGE, SUBSCRIPTION_FETCH_FAILED_MESSAGE};
use thiserror::Error;

/// Failure reported by a backend port
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Backend responded with status {status}")]
    Status { status: u16, detail: Option<String> },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Human-readable `detail` supplied by the backend, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, BackendError::Status { status, .. } if (400..500).contains(status))
    }
}

/// Errors surfaced by the session manager.
///
/// `Display` yields the message meant for the end user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Rejected { message: String },

    #[error("{message}")]
    Unavailable { message: String },

    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    #[error("Token expired")]
    TokenExpired,

    #[error("Session changed while logging in")]
    Superseded,
}

impl AuthError {
    pub(crate) fn from_backend(error: &BackendError) -> Self {
        let message = error.detail().unwrap_or(LOGIN_FAILED_MESSAGE).to_string();
        if error.is_client_error() {
            AuthError::Rejected { message }
        } else {
            AuthError::Unavailable { message }
        }
    }
}

/// Errors surfaced by the entitlement service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubscriptionError {
    #[error("No active session")]
    NotAuthenticated,

    #[error("{message}")]
    Rejected { message: String },

    #[error("{message}")]
    Unavailable { message: String },

    #[error("Session changed while the subscription was loading")]
    Superseded,
}

impl SubscriptionError {
    pub(crate) fn from_backend(error: &BackendError) -> Self {
        let message = error
            .detail()
            .unwrap_or(SUBSCRIPTION_FETCH_FAILED_MESSAGE)
            .to_string();
        if error.is_client_error() {
            SubscriptionError::Rejected { message }
        } else {
            SubscriptionError::Unavailable { message }
        }
    }
}

/// Persisted session storage failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(String),

    #[error("Storage serialization error: {0}")]
    Serialization(String),
}
