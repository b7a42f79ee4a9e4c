//! In-memory backend and helpers shared by unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::api::{ApiError, ApiResult, DashboardApi, LoginResponse};
use crate::error::Result;
use crate::models::{
    ApiKey, ApiKeyStatus, BusLockBalance, CreatedApiKey, KycStatus, NewPayment, Payment,
    PortfolioSummary, Settings, SettingsUpdate, Transaction, TransactionDetail, TransactionId, TransactionPage,
    TransactionQuery, TransactionStatus, TreasuryPosition,
};
use crate::session::{
    MemorySessionStore, Session, SessionGuard, SessionPersistence, SessionStore, UserProfile,
};

pub const ALICE: &str = "alice@example.com";

#[derive(Debug, Clone, Default)]
pub struct CountingPersistence {
    inner: MemorySessionStore,
    clears: Arc<AtomicUsize>,
}

impl CountingPersistence {
    pub fn clear_count(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl SessionPersistence for CountingPersistence {
    fn load_session(&self) -> Result<Option<Session>> {
        self.inner.load_session()
    }

    fn save_session(&self, session: &Session) -> Result<()> {
        self.inner.save_session(session)
    }

    fn clear_session(&self) -> Result<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear_session()
    }
}

pub fn profile(email: &str) -> UserProfile {
    UserProfile {
        id: "user_1".to_string(),
        email: Some(email.to_string()),
        company_name: Some("Acme".to_string()),
    }
}

/// Guard holding a session with token `tok-1`.
pub fn signed_in_guard() -> (SessionGuard, CountingPersistence) {
    let persistence = CountingPersistence::default();
    persistence
        .save_session(&Session::new("tok-1", profile("ops@acme.io")))
        .unwrap();
    let store = SessionStore::restore(persistence.clone()).unwrap();
    (SessionGuard::new(store), persistence)
}

pub fn transaction(index: usize, status: TransactionStatus, email: Option<&str>) -> Transaction {
    Transaction {
        id: format!("00000000-0000-4000-8000-{index:012}"),
        tx_type: "payment".to_string(),
        amount: format!("{index}.00"),
        currency: "USD".to_string(),
        status,
        created_at: format!("2026-10-{:02} 10:00:00", (index % 28) + 1),
        customer_email: email.map(ToString::to_string),
    }
}

pub fn position(name: &str, value: f64, apy: &str) -> TreasuryPosition {
    TreasuryPosition {
        name: name.to_string(),
        protocol: "aave".to_string(),
        balance: format!("{value:.2}"),
        value,
        apy: apy.to_string(),
    }
}

#[derive(Default)]
struct FakeState {
    calls: HashMap<&'static str, usize>,
    reject_unauthorized: bool,
    failures: HashMap<&'static str, ApiError>,
    settings: Option<Settings>,
    api_keys: Vec<ApiKey>,
    next_key: usize,
    positions: Vec<TreasuryPosition>,
    portfolio_total: f64,
    transactions: Vec<Transaction>,
    transaction_queries: Vec<TransactionQuery>,
    next_payment: usize,
}

/// Scriptable [`DashboardApi`] that filters and paginates like the server.
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.state().calls.get(operation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state().calls.values().sum()
    }

    pub fn reject_all_as_unauthorized(&self) {
        self.state().reject_unauthorized = true;
    }

    pub fn accept_tokens(&self) {
        self.state().reject_unauthorized = false;
    }

    /// Makes the next call to `operation` fail with `error`.
    pub fn fail_next(&self, operation: &'static str, error: ApiError) {
        self.state().failures.insert(operation, error);
    }

    pub fn with_settings(self, settings: Settings) -> Self {
        self.state().settings = Some(settings);
        self
    }

    pub fn with_positions(self, positions: Vec<TreasuryPosition>, total: f64) -> Self {
        {
            let mut state = self.state();
            state.positions = positions;
            state.portfolio_total = total;
        }
        self
    }

    pub fn with_transactions(self, transactions: Vec<Transaction>) -> Self {
        self.state().transactions = transactions;
        self
    }

    pub fn with_api_key(self, name: &str) -> Self {
        {
            let mut state = self.state();
            let key = new_key(&mut state, name);
            state.api_keys.push(key);
        }
        self
    }

    pub fn last_transaction_query(&self) -> Option<TransactionQuery> {
        self.state().transaction_queries.last().cloned()
    }

    pub async fn list_api_keys_slow(&self, token: &str) -> ApiResult<Vec<ApiKey>> {
        self.record("list_api_keys")?;
        tokio::task::yield_now().await;
        self.check_token(token)?;
        Ok(self.state().api_keys.clone())
    }

    fn record(&self, operation: &'static str) -> ApiResult<()> {
        let mut state = self.state();
        *state.calls.entry(operation).or_default() += 1;
        if let Some(error) = state.failures.remove(operation) {
            return Err(error);
        }
        Ok(())
    }

    fn check_token(&self, token: &str) -> ApiResult<()> {
        if self.state().reject_unauthorized || token.is_empty() {
            return Err(ApiError::Unauthorized("token rejected".to_string()));
        }
        Ok(())
    }

    fn authorized(&self, operation: &'static str, token: &str) -> ApiResult<()> {
        self.record(operation)?;
        self.check_token(token)
    }
}

fn new_key(state: &mut FakeState, name: &str) -> ApiKey {
    state.next_key += 1;
    ApiKey {
        id: format!("key_{:02}", state.next_key),
        name: name.to_string(),
        key_prefix: format!("pk_test_{:04}", state.next_key),
        created_at: "2026-10-19T08:00:00Z".to_string(),
        last_used: None,
        permissions: ["payments:read".to_string()].into_iter().collect(),
        status: ApiKeyStatus::Active,
    }
}

fn matches_search(transaction: &Transaction, search: &str) -> bool {
    let needle = search.to_lowercase();
    transaction
        .customer_email
        .as_deref()
        .is_some_and(|email| email.to_lowercase().contains(&needle))
        || transaction.status.as_str().contains(&needle)
}

impl DashboardApi for FakeApi {
    async fn login(&self, email: &str, _password: &str) -> ApiResult<LoginResponse> {
        self.record("login")?;
        if self.state().reject_unauthorized {
            return Err(ApiError::Unauthorized("bad credentials".to_string()));
        }
        Ok(LoginResponse {
            token: "tok-login".to_string(),
            user: profile(email),
        })
    }

    async fn logout(&self, token: &str) -> ApiResult<()> {
        self.authorized("logout", token)
    }

    async fn get_settings(&self, token: &str) -> ApiResult<Settings> {
        self.authorized("get_settings", token)?;
        Ok(self.state().settings.clone().unwrap_or(Settings {
            company_name: "Acme".to_string(),
            email: "ops@acme.io".to_string(),
            website: String::new(),
            registration_number: Some("RC-1001".to_string()),
            kyc_status: KycStatus::Pending,
        }))
    }

    async fn update_settings(&self, token: &str, update: &SettingsUpdate) -> ApiResult<Settings> {
        self.authorized("update_settings", token)?;
        let mut state = self.state();
        let mut settings = state.settings.clone().unwrap_or(Settings {
            company_name: String::new(),
            email: String::new(),
            website: String::new(),
            registration_number: Some("RC-1001".to_string()),
            kyc_status: KycStatus::Pending,
        });
        settings.company_name.clone_from(&update.company_name);
        settings.email.clone_from(&update.email);
        settings.website.clone_from(&update.website);
        state.settings = Some(settings.clone());
        Ok(settings)
    }

    async fn list_api_keys(&self, token: &str) -> ApiResult<Vec<ApiKey>> {
        self.authorized("list_api_keys", token)?;
        Ok(self.state().api_keys.clone())
    }

    async fn create_api_key(&self, token: &str, name: &str) -> ApiResult<CreatedApiKey> {
        self.authorized("create_api_key", token)?;
        let mut state = self.state();
        let key = new_key(&mut state, name);
        state.api_keys.push(key.clone());
        let mut wire = serde_json::to_value(&key).map_err(|e| ApiError::Decode(e.to_string()))?;
        wire["secret_key"] = serde_json::Value::String(format!("{}_s3cr3t", key.key_prefix));
        serde_json::from_value(wire).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn delete_api_key(&self, token: &str, id: &str) -> ApiResult<()> {
        self.authorized("delete_api_key", token)?;
        let mut state = self.state();
        let before = state.api_keys.len();
        state.api_keys.retain(|key| key.id != id);
        if state.api_keys.len() == before {
            return Err(ApiError::Status {
                status: 404,
                message: "API key not found".to_string(),
            });
        }
        Ok(())
    }

    async fn list_positions(&self, token: &str) -> ApiResult<Vec<TreasuryPosition>> {
        self.authorized("list_positions", token)?;
        Ok(self.state().positions.clone())
    }

    async fn portfolio_summary(&self, token: &str) -> ApiResult<PortfolioSummary> {
        self.authorized("portfolio_summary", token)?;
        Ok(PortfolioSummary {
            total_value: self.state().portfolio_total,
        })
    }

    async fn bus_lock_balance(&self, token: &str) -> ApiResult<BusLockBalance> {
        self.authorized("bus_lock_balance", token)?;
        serde_json::from_value(serde_json::json!({
            "locked_amount": 250.0,
            "required_amount": 400.0,
            "last_calculated_at": "2026-10-19 07:00:00"
        }))
        .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn list_transactions(
        &self,
        token: &str,
        query: &TransactionQuery,
    ) -> ApiResult<TransactionPage> {
        self.authorized("list_transactions", token)?;
        let mut state = self.state();
        state.transaction_queries.push(query.clone());
        let filtered = state
            .transactions
            .iter()
            .filter(|tx| query.status.map_or(true, |status| tx.status == status))
            .filter(|tx| {
                query
                    .search
                    .as_deref()
                    .map_or(true, |search| matches_search(tx, search))
            })
            .cloned()
            .collect::<Vec<_>>();
        let offset = (query.page.max(1) as usize - 1) * query.limit;
        Ok(TransactionPage {
            total: filtered.len() as u64,
            transactions: filtered.into_iter().skip(offset).take(query.limit).collect(),
            page: Some(query.page),
        })
    }

    async fn get_transaction(
        &self,
        token: &str,
        id: &TransactionId,
    ) -> ApiResult<TransactionDetail> {
        self.authorized("get_transaction", token)?;
        let id = id.to_string();
        self.state()
            .transactions
            .iter()
            .find(|tx| tx.id == id)
            .cloned()
            .map(|transaction| TransactionDetail {
                transaction,
                metadata: Some(serde_json::json!({"source": "fake"})),
            })
            .ok_or(ApiError::Status {
                status: 404,
                message: "Transaction not found".to_string(),
            })
    }

    async fn create_payment(&self, token: &str, payment: &NewPayment) -> ApiResult<Payment> {
        self.authorized("create_payment", token)?;
        let mut state = self.state();
        state.next_payment += 1;
        let transaction = Transaction {
            id: format!("00000000-0000-4000-9000-{:012}", state.next_payment),
            tx_type: "payment".to_string(),
            amount: format!("{:.2}", payment.amount),
            currency: payment.currency.clone(),
            status: TransactionStatus::Pending,
            created_at: "2026-10-19 08:30:00".to_string(),
            customer_email: Some(payment.customer_email.clone()),
        };
        state.transactions.insert(0, transaction.clone());
        Ok(payment_from(&transaction))
    }

    async fn get_payment(&self, token: &str, id: &TransactionId) -> ApiResult<Payment> {
        self.authorized("get_payment", token)?;
        let id = id.to_string();
        self.state()
            .transactions
            .iter()
            .find(|tx| tx.id == id)
            .map(payment_from)
            .ok_or(ApiError::Status {
                status: 404,
                message: "Payment not found".to_string(),
            })
    }
}

fn payment_from(transaction: &Transaction) -> Payment {
    Payment {
        id: transaction.id.clone(),
        amount: transaction.amount.parse().unwrap_or(0.0),
        currency: transaction.currency.clone(),
        status: transaction.status,
        customer_email: transaction.customer_email.clone().unwrap_or_default(),
        created_at: transaction.created_at.clone(),
    }
}
