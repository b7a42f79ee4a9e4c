use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] paydash_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "Profile '{0}' has no API base URL. Run `paydash config init --profile {0} --api-base-url <URL>` or set PAYDASH_API_URL."
    )]
    NotConfigured(String),
    #[error("Profile '{0}' is not signed in. Run `paydash auth login --email <email>`.")]
    NotSignedIn(String),
    #[error("No API key matches '{0}'")]
    KeyNotFound(String),
    #[error("{0}")]
    AmbiguousKey(String),
    #[error("Password cannot be empty")]
    EmptyPassword,
}

impl CliError {
    /// Whether the stored session is gone and the user must sign in again.
    pub const fn needs_sign_in(&self) -> bool {
        matches!(
            self,
            Self::NotSignedIn(_) | Self::Core(paydash_core::Error::SessionInvalid)
        )
    }
}
