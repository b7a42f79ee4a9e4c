//! Error types for paydash-core

use thiserror::Error;

/// Result type alias using paydash-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown whenever a request is refused because the session is gone.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Errors surfaced to dashboard pages.
///
/// `SessionInvalid` is produced only by the session guard and always means the
/// stored session has already been cleared; callers should move to a signed-out
/// view instead of offering a retry.
#[derive(Error, Debug)]
pub enum Error {
    /// The remote API rejected the credential, or no session exists.
    #[error("{SESSION_EXPIRED_MESSAGE}")]
    SessionInvalid,

    /// Client-side input check failed; no request was sent.
    #[error("{0}")]
    Validation(String),

    /// Network or server failure, message suitable for display.
    #[error("{0}")]
    Remote(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session persistence backend failed
    #[error("Secure storage error: {0}")]
    SecureStorage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub const fn is_session_invalid(&self) -> bool {
        matches!(self, Self::SessionInvalid)
    }

    /// Whether retrying the same action could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}
