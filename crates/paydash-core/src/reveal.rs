//! One-time display of a newly created API key secret.

use std::future::Future;

use crate::api::ApiResult;
use crate::error::Result;
use crate::models::{ApiKey, CreatedApiKey, OneTimeSecret};
use crate::mutation::require_text;
use crate::session::SessionGuard;

/// Key creation state. The secret only ever lives in `Revealed`.
#[derive(Debug, Default)]
pub enum RevealState {
    #[default]
    Idle,
    Submitting,
    Revealed {
        key: ApiKey,
        secret: OneTimeSecret,
    },
    Failed(String),
}

impl RevealState {
    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        matches!(self, Self::Revealed { .. })
    }
}

/// Drives `Idle -> Submitting -> Revealed | Failed` for one create dialog.
#[derive(Debug, Default)]
pub struct KeyCreationFlow {
    state: RevealState,
}

impl KeyCreationFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn state(&self) -> &RevealState {
        &self.state
    }

    /// The created key and its secret while the reveal is open.
    pub fn revealed(&self) -> Option<(&ApiKey, &OneTimeSecret)> {
        match &self.state {
            RevealState::Revealed { key, secret } => Some((key, secret)),
            _ => None,
        }
    }

    /// Validates `name` and creates the key through `guard`.
    ///
    /// A blank name fails before any request and leaves the state as is.
    pub async fn submit<F, Fut>(
        &mut self,
        guard: &SessionGuard,
        name: &str,
        create: F,
    ) -> Result<ApiKey>
    where
        F: FnOnce(String, String) -> Fut,
        Fut: Future<Output = ApiResult<CreatedApiKey>>,
    {
        let name = require_text(name, "Name")?;
        self.close();
        self.state = RevealState::Submitting;

        match guard.call(|token| create(token, name)).await {
            Ok(created) => {
                let (key, secret) = created.into_parts();
                tracing::info!("Created API key '{}' ({})", key.name, key.key_prefix);
                let summary = key.clone();
                self.state = RevealState::Revealed { key, secret };
                Ok(summary)
            }
            Err(error) => {
                self.state = RevealState::Failed(error.to_string());
                Err(error)
            }
        }
    }

    /// Drops any revealed secret and returns to `Idle`.
    ///
    /// Returns whether a secret was discarded.
    pub fn close(&mut self) -> bool {
        let previous = std::mem::take(&mut self.state);
        previous.is_revealed()
    }
}
