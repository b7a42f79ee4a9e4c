//! `reqwest` implementation of [`DashboardApi`].

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{ApiError, ApiResult, DashboardApi, LoginResponse};
use crate::config::{compact_text, ClientConfig};
use crate::error::{Error, Result};
use crate::models::{
    ApiKey, BusLockBalance, CreatedApiKey, NewPayment, Payment, PortfolioSummary, Settings,
    SettingsUpdate, TransactionDetail, TransactionId, TransactionPage, TransactionQuery,
    TreasuryPosition,
};

/// JSON-over-HTTP client for the payments backend.
#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    config: ClientConfig,
    client: Client,
}

impl HttpDashboardApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|error| Error::Config(format!("Failed to construct HTTP client: {error}")))?;
        Ok(Self { config, client })
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.config.api_base_url
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> RequestBuilder {
        request
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    fn get(&self, route: &str, token: &str) -> RequestBuilder {
        self.authorized(self.client.get(self.config.endpoint(route)), token)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = self.send(request).await?;
        let body = response
            .text()
            .await
            .map_err(|error| {
                ApiError::Transport(format!("Failed to read response: {}", error.without_url()))
            })?;
        serde_json::from_str(&body).map_err(|error| ApiError::Decode(error.to_string()))
    }

    async fn send_empty(&self, request: RequestBuilder) -> ApiResult<()> {
        self.send(request).await.map(|_| ())
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|error| ApiError::Transport(error.without_url().to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = parse_api_error(status, &body);
        if status == StatusCode::UNAUTHORIZED {
            Err(ApiError::Unauthorized(message))
        } else {
            Err(ApiError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

impl DashboardApi for HttpDashboardApi {
    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let request = self
            .client
            .post(self.config.endpoint("auth/login"))
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }));
        self.send_json(request).await
    }

    async fn logout(&self, token: &str) -> ApiResult<()> {
        let request =
            self.authorized(self.client.post(self.config.endpoint("auth/logout")), token);
        self.send_empty(request).await
    }

    async fn get_settings(&self, token: &str) -> ApiResult<Settings> {
        self.send_json(self.get("settings", token)).await
    }

    async fn update_settings(&self, token: &str, update: &SettingsUpdate) -> ApiResult<Settings> {
        let request = self
            .authorized(self.client.put(self.config.endpoint("settings")), token)
            .json(update);
        self.send_json(request).await
    }

    async fn list_api_keys(&self, token: &str) -> ApiResult<Vec<ApiKey>> {
        self.send_json(self.get("api-keys", token)).await
    }

    async fn create_api_key(&self, token: &str, name: &str) -> ApiResult<CreatedApiKey> {
        let request = self
            .authorized(self.client.post(self.config.endpoint("api-keys")), token)
            .json(&serde_json::json!({ "name": name }));
        self.send_json(request).await
    }

    async fn delete_api_key(&self, token: &str, id: &str) -> ApiResult<()> {
        let route = format!("api-keys/{}", urlencoding::encode(id));
        let request = self.authorized(self.client.delete(self.config.endpoint(&route)), token);
        self.send_empty(request).await
    }

    async fn list_positions(&self, token: &str) -> ApiResult<Vec<TreasuryPosition>> {
        self.send_json(self.get("treasury/positions", token)).await
    }

    async fn portfolio_summary(&self, token: &str) -> ApiResult<PortfolioSummary> {
        self.send_json(self.get("treasury/portfolio", token)).await
    }

    async fn bus_lock_balance(&self, token: &str) -> ApiResult<BusLockBalance> {
        self.send_json(self.get("bus-lock", token)).await
    }

    async fn list_transactions(
        &self,
        token: &str,
        query: &TransactionQuery,
    ) -> ApiResult<TransactionPage> {
        let request = self.get("transactions", token).query(&query.to_pairs());
        self.send_json(request).await
    }

    async fn get_transaction(
        &self,
        token: &str,
        id: &TransactionId,
    ) -> ApiResult<TransactionDetail> {
        self.send_json(self.get(&format!("transactions/{id}"), token))
            .await
    }

    async fn create_payment(&self, token: &str, payment: &NewPayment) -> ApiResult<Payment> {
        let request = self
            .authorized(self.client.post(self.config.endpoint("payments")), token)
            .json(payment);
        self.send_json(request).await
    }

    async fn get_payment(&self, token: &str, id: &TransactionId) -> ApiResult<Payment> {
        self.send_json(self.get(&format!("payments/{id}"), token))
            .await
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorResponse>(body) {
        if let Some(message) = payload
            .message
            .or(payload.msg)
            .or(payload.error)
            .filter(|message| !message.trim().is_empty())
        {
            return message.trim().to_string();
        }
    }

    let compact = compact_text(body);
    if compact.is_empty() {
        format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or_default()
        )
        .trim_end()
        .to_string()
    } else {
        compact
    }
}
