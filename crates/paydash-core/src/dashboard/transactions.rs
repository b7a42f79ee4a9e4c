use crate::api::{ApiResult, DashboardApi};
use crate::config::DEFAULT_PAGE_SIZE;
use crate::error::Result;
use crate::list_view::{ListPage, ListSource, ListViewController, PageRequest};
use crate::models::{
    NewPayment, Payment, Transaction, TransactionDetail, TransactionId, TransactionQuery,
    TransactionStatus,
};
use crate::session::SessionGuard;

/// `GET transactions`; search and status filtering happen server-side.
#[derive(Debug, Clone)]
pub struct TransactionSource<A> {
    api: A,
    page_size: usize,
}

impl<A> TransactionSource<A> {
    pub fn new(api: A, page_size: usize) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
        }
    }
}

impl<A: DashboardApi> ListSource for TransactionSource<A> {
    type Item = Transaction;
    type Status = TransactionStatus;

    fn page_size(&self) -> Option<usize> {
        Some(self.page_size)
    }

    async fn fetch(
        &self,
        token: &str,
        request: &PageRequest<TransactionStatus>,
    ) -> ApiResult<ListPage<Transaction>> {
        let query = TransactionQuery {
            page: request.page,
            limit: self.page_size,
            search: request.filters.search.clone(),
            status: request.filters.status,
        };
        let page = self.api.list_transactions(token, &query).await?;
        if let Some(echoed) = page.page.filter(|echoed| *echoed != request.page) {
            tracing::debug!("Server answered page {} for page {}", echoed, request.page);
        }
        Ok(ListPage {
            items: page.transactions,
            total: page.total,
        })
    }
}

/// Transaction history with detail lookup and payment requests.
pub struct TransactionsPage<A: DashboardApi> {
    api: A,
    list: ListViewController<TransactionSource<A>>,
}

impl<A: DashboardApi + Clone> TransactionsPage<A> {
    pub fn new(guard: SessionGuard, api: A) -> Self {
        Self::with_page_size(guard, api, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(guard: SessionGuard, api: A, page_size: usize) -> Self {
        Self {
            list: ListViewController::new(guard, TransactionSource::new(api.clone(), page_size)),
            api,
        }
    }

    pub const fn list(&self) -> &ListViewController<TransactionSource<A>> {
        &self.list
    }

    /// Looks up one transaction. `id` must be a UUID.
    pub async fn detail(&self, id: &str) -> Result<TransactionDetail> {
        let id: TransactionId = id.parse()?;
        let api = &self.api;
        self.list
            .guard()
            .call(|token| async move { api.get_transaction(&token, &id).await })
            .await
    }

    /// Requests a payment and reloads the history, where it appears as a
    /// pending transaction.
    pub async fn create_payment(&self, payment: NewPayment) -> Result<Payment> {
        let payment = payment.validated()?;
        let api = &self.api;
        let payment = &payment;
        let created = self
            .list
            .mutate(|token| async move { api.create_payment(&token, payment).await })
            .await?;
        tracing::info!("Created payment {}", created.id);
        Ok(created)
    }

    /// Looks up one payment. `id` must be a UUID.
    pub async fn payment(&self, id: &str) -> Result<Payment> {
        let id: TransactionId = id.parse()?;
        let api = &self.api;
        self.list
            .guard()
            .call(|token| async move { api.get_payment(&token, &id).await })
            .await
    }
}
