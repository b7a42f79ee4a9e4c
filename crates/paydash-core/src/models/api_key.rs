//! API key models
//!
//! The persisted [`ApiKey`] record has no field for secret material. The full
//! key only ever exists inside a [`OneTimeSecret`], which is produced once from
//! a creation response and cannot be cloned or serialized.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyStatus {
    #[default]
    Active,
    Revoked,
}

impl ApiKeyStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
        }
    }
}

/// Non-secret summary of an API key as listed by `GET api-keys`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: String,
    pub name: String,
    pub key_prefix: String,
    pub created_at: String,
    #[serde(default)]
    pub last_used: Option<String>,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    #[serde(default)]
    pub status: ApiKeyStatus,
}

/// Response of `POST api-keys`: the new key's summary plus its secret.
#[derive(Deserialize)]
pub struct CreatedApiKey {
    #[serde(flatten)]
    pub key: ApiKey,
    secret_key: Zeroizing<String>,
}

impl CreatedApiKey {
    /// Separates the storable summary from the secret.
    #[must_use]
    pub fn into_parts(self) -> (ApiKey, OneTimeSecret) {
        (self.key, OneTimeSecret(self.secret_key))
    }
}

impl fmt::Debug for CreatedApiKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CreatedApiKey")
            .field("key", &self.key)
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}

/// Full API key value, shown to the user exactly once.
///
/// Memory is zeroed when the value is dropped.
pub struct OneTimeSecret(Zeroizing<String>);

impl OneTimeSecret {
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for OneTimeSecret {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("OneTimeSecret([REDACTED])")
    }
}
