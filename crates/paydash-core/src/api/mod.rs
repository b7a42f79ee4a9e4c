//! Remote API boundary consumed by the dashboard pages.
//!
//! [`DashboardApi`] describes the shapes the client needs from the server.
//! Every authenticated method takes the bearer token explicitly; callers are
//! expected to route those calls through [`crate::SessionGuard`] rather than
//! reading the session themselves.

mod http;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    ApiKey, BusLockBalance, CreatedApiKey, NewPayment, Payment, PortfolioSummary, Settings,
    SettingsUpdate, TransactionDetail, TransactionId, TransactionPage, TransactionQuery,
    TreasuryPosition,
};
use crate::session::UserProfile;

pub use http::HttpDashboardApi;

/// Transport-level failure reported by a [`DashboardApi`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("{message} ({status})")]
    Status { status: u16, message: String },
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Whether this failure means the credential is no longer accepted.
    ///
    /// A structured 401 always qualifies. A server message mentioning `401`
    /// or `Unauthorized` also qualifies, since some gateways only report the
    /// rejection in the body text. Transport and decode text is produced
    /// locally and never counts.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Unauthorized(_) | Self::Status { status: 401, .. } => true,
            Self::Status { message, .. } => mentions_unauthorized(message),
            Self::Transport(_) | Self::Decode(_) => false,
        }
    }
}

fn mentions_unauthorized(message: &str) -> bool {
    message.contains("401") || message.contains("Unauthorized")
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Successful `POST auth/login` payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("LoginResponse")
            .field("token", &"[REDACTED]")
            .field("user", &self.user)
            .finish()
    }
}

/// Operations the dashboard needs from the payments backend.
#[allow(async_fn_in_trait)]
pub trait DashboardApi {
    /// Exchange credentials for a bearer token (unauthenticated).
    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse>;

    /// Invalidate the token server-side.
    async fn logout(&self, token: &str) -> ApiResult<()>;

    async fn get_settings(&self, token: &str) -> ApiResult<Settings>;

    /// Save the editable settings fields and return the stored record.
    async fn update_settings(&self, token: &str, update: &SettingsUpdate) -> ApiResult<Settings>;

    async fn list_api_keys(&self, token: &str) -> ApiResult<Vec<ApiKey>>;

    /// Create a key; the response is the only place its secret appears.
    async fn create_api_key(&self, token: &str, name: &str) -> ApiResult<CreatedApiKey>;

    async fn delete_api_key(&self, token: &str, id: &str) -> ApiResult<()>;

    async fn list_positions(&self, token: &str) -> ApiResult<Vec<TreasuryPosition>>;

    async fn portfolio_summary(&self, token: &str) -> ApiResult<PortfolioSummary>;

    async fn bus_lock_balance(&self, token: &str) -> ApiResult<BusLockBalance>;

    async fn list_transactions(
        &self,
        token: &str,
        query: &TransactionQuery,
    ) -> ApiResult<TransactionPage>;

    async fn get_transaction(&self, token: &str, id: &TransactionId)
        -> ApiResult<TransactionDetail>;

    /// Request a payment; the server records it as a pending transaction.
    async fn create_payment(&self, token: &str, payment: &NewPayment) -> ApiResult<Payment>;

    async fn get_payment(&self, token: &str, id: &TransactionId) -> ApiResult<Payment>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_401_is_unauthorized() {
        let error = ApiError::Status {
            status: 401,
            message: "token expired".to_string(),
        };
        assert!(error.is_unauthorized());
        assert!(ApiError::Unauthorized("expired".to_string()).is_unauthorized());
    }

    #[test]
    fn legacy_message_patterns_are_unauthorized() {
        let error = ApiError::Status {
            status: 502,
            message: "upstream returned 401".to_string(),
        };
        assert!(error.is_unauthorized());
        let error = ApiError::Status {
            status: 403,
            message: "Unauthorized".to_string(),
        };
        assert!(error.is_unauthorized());
    }

    #[test]
    fn locally_produced_text_is_never_unauthorized() {
        let decode = serde_json::from_str::<serde_json::Value>(&format!("{}x", " ".repeat(400)))
            .unwrap_err();
        assert!(decode.to_string().contains("column 401"));
        assert!(!ApiError::Decode(decode.to_string()).is_unauthorized());
        assert!(!ApiError::Transport(
            "error sending request for url (https://pay.example.com/api/transactions?search=order-401)"
                .to_string()
        )
        .is_unauthorized());
        assert!(!ApiError::Transport("Unauthorized proxy".to_string()).is_unauthorized());
    }

    #[test]
    fn other_failures_are_not_unauthorized() {
        let error = ApiError::Status {
            status: 503,
            message: "maintenance".to_string(),
        };
        assert!(!error.is_unauthorized());
        assert!(!ApiError::Transport("connection reset".to_string()).is_unauthorized());
    }

    #[test]
    fn login_response_debug_redacts_token() {
        let response = LoginResponse {
            token: "secret-bearer".to_string(),
            user: UserProfile {
                id: "user_1".to_string(),
                email: None,
                company_name: None,
            },
        };
        let rendered = format!("{response:?}");
        assert!(!rendered.contains("secret-bearer"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
