//! Client configuration shared by every Paydash front end.
//!
//! Holds the remote API base URL plus the few tunables the data layer needs.
//! Values are public endpoints only; credentials live in the session store.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Rows requested per page when a list is paginated.
pub const DEFAULT_PAGE_SIZE: usize = 10;
/// Largest page the transactions endpoint accepts.
pub const MAX_PAGE_SIZE: usize = 100;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
const API_PATH_SUFFIX: &str = "/api";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl ClientConfig {
    /// Builds a config for `api_base_url` with default timeout and page size.
    pub fn new(api_base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            api_base_url: normalize_base_url(api_base_url.as_ref())?,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Full URL for a route below the `/api` prefix, e.g. `settings`.
    #[must_use]
    pub fn endpoint(&self, route: &str) -> String {
        format!(
            "{}{}/{}",
            self.api_base_url,
            API_PATH_SUFFIX,
            route.trim_start_matches('/')
        )
    }
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// Validates and canonicalises an API base URL.
///
/// Trailing slashes and a trailing `/api` segment are stripped so routes can
/// be appended uniformly.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config("API base URL must not be empty".to_string()));
    }
    if !is_http_url(trimmed) {
        return Err(Error::Config(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(trimmed
        .strip_suffix(API_PATH_SUFFIX)
        .unwrap_or(trimmed)
        .to_string())
}

/// Trim optional text, mapping blanks to `None`.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("http://") || value.starts_with("https://")
}

/// Shortens a server response body for inclusion in an error message.
pub fn compact_text(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(180)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_base_url_strips_api_suffix_and_slashes() {
        assert_eq!(
            normalize_base_url(" https://pay.example.com/api/ ").unwrap(),
            "https://pay.example.com"
        );
        assert_eq!(
            normalize_base_url("http://localhost:8080").unwrap(),
            "http://localhost:8080"
        );
    }

    #[test]
    fn normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url("   ").is_err());
        assert!(normalize_base_url("pay.example.com").is_err());
    }

    #[test]
    fn endpoint_joins_routes_under_api_prefix() {
        let config = ClientConfig::new("https://pay.example.com").unwrap();
        assert_eq!(
            config.endpoint("/treasury/positions"),
            "https://pay.example.com/api/treasury/positions"
        );
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn page_size_is_clamped_to_server_limit() {
        let config = ClientConfig::new("https://pay.example.com")
            .unwrap()
            .with_page_size(500);
        assert_eq!(config.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn compact_text_collapses_whitespace() {
        assert_eq!(compact_text("  bad\n  gateway  "), "bad gateway");
    }

    #[test]
    fn normalize_text_option_rejects_blank() {
        assert_eq!(normalize_text_option(Some("  ".to_string())), None);
        assert_eq!(
            normalize_text_option(Some(" ops ".to_string())).as_deref(),
            Some("ops")
        );
    }
}
