//! Company settings model

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::is_http_url;
use crate::error::{Error, Result};

/// KYC review state reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KycStatus {
    Pending,
    Verified,
    Rejected,
    /// Anything the server reports that this client does not recognise
    #[default]
    #[serde(other)]
    Unknown,
}

impl KycStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }
}

/// Company settings as returned by `GET settings`.
///
/// `registration_number` and `kyc_status` are server-owned and never sent back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub registration_number: Option<String>,
    #[serde(default)]
    pub kyc_status: KycStatus,
}

/// Editable subset of [`Settings`], the only body `PUT settings` accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub company_name: String,
    pub email: String,
    pub website: String,
}

impl SettingsUpdate {
    /// Trims every field and checks it before anything is sent.
    pub fn validated(self) -> Result<Self> {
        let company_name = self.company_name.trim().to_string();
        let email = self.email.trim().to_string();
        let website = self.website.trim().to_string();

        if company_name.is_empty() {
            return Err(Error::Validation("Company name is required".to_string()));
        }
        if email.is_empty() {
            return Err(Error::Validation("Email is required".to_string()));
        }
        if !email_pattern().is_match(&email) {
            return Err(Error::Validation(format!(
                "'{email}' is not a valid email address"
            )));
        }
        if !website.is_empty() && !is_http_url(&website) {
            return Err(Error::Validation(
                "Website must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            company_name,
            email,
            website,
        })
    }
}

impl From<&Settings> for SettingsUpdate {
    fn from(settings: &Settings) -> Self {
        Self {
            company_name: settings.company_name.clone(),
            email: settings.email.clone(),
            website: settings.website.clone(),
        }
    }
}

pub(crate) fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex"))
}
