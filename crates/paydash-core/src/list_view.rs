//! Query-driven list views backed by the remote API.
//!
//! A [`ListViewController`] owns the inputs of one list page (search text,
//! status filter, page number) and re-fetches through the [`SessionGuard`]
//! whenever a hard input changes. Search text is a soft input: edits only
//! update a draft until [`ListViewController::submit_search`] commits it.
//!
//! Fetches carry a sequence number. A response is applied only when it is
//! newer than the one currently displayed, so a slow response for a
//! superseded query can never overwrite a newer result.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::ApiResult;
use crate::error::{Error, Result};
use crate::session::SessionGuard;

/// Status type for lists that have no status filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoStatus {}

/// Remote collection a controller pages through.
#[allow(async_fn_in_trait)]
pub trait ListSource {
    type Item: Clone;
    type Status: Copy + Eq + fmt::Debug;

    /// Rows per page, or `None` when the endpoint returns everything at once.
    fn page_size(&self) -> Option<usize>;

    async fn fetch(
        &self,
        token: &str,
        request: &PageRequest<Self::Status>,
    ) -> ApiResult<ListPage<Self::Item>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilters<S> {
    pub search: Option<String>,
    pub status: Option<S>,
}

impl<S> Default for ListFilters<S> {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
        }
    }
}

/// Everything a source needs to fetch one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<S> {
    pub page: u32,
    pub page_size: Option<usize>,
    pub filters: ListFilters<S>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: u64,
}

impl<T> ListPage<T> {
    /// Page for an endpoint that returns the whole collection.
    #[must_use]
    pub fn complete(items: Vec<T>) -> Self {
        let total = items.len() as u64;
        Self { items, total }
    }
}

/// Fetch lifecycle of a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet
    Idle,
    Loading,
    /// Last applied fetch succeeded; an empty list is still `Ready`
    Ready,
    /// Last applied fetch failed; previous items are kept for display
    Failed(String),
}

impl Phase {
    /// Whether the view should offer a retry.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Partial filter change for [`ListViewController::set_filter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterUpdate<S> {
    /// New search draft; not applied until submitted
    pub search: Option<String>,
    /// New status filter (`Some(None)` clears it)
    pub status: Option<Option<S>>,
}

impl<S> FilterUpdate<S> {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            status: None,
        }
    }

    pub const fn status(status: Option<S>) -> Self {
        Self {
            search: None,
            status: Some(status),
        }
    }
}

/// What a filter change did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterEffect {
    Unchanged,
    /// Search draft updated, waiting for submit
    Deferred,
    Refetched,
}

/// An issued, not yet applied fetch.
#[derive(Debug)]
#[must_use = "a ticket does nothing until passed to `complete`"]
pub struct FetchTicket<S> {
    seq: u64,
    request: PageRequest<S>,
}

impl<S> FetchTicket<S> {
    pub const fn request(&self) -> &PageRequest<S> {
        &self.request
    }
}

/// Read-only copy of a controller's state for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot<T, S> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub filters: ListFilters<S>,
    pub search_draft: String,
    pub phase: Phase,
    pub has_more: bool,
}

struct ListState<T, S> {
    items: Vec<T>,
    total: u64,
    page: u32,
    filters: ListFilters<S>,
    search_draft: String,
    phase: Phase,
    issued: u64,
    applied: u64,
    /// Request whose response is currently displayed
    displayed: Option<PageRequest<S>>,
    displayed_len: usize,
}

impl<T, S: Clone> ListState<T, S> {
    fn request(&self, page_size: Option<usize>) -> PageRequest<S> {
        PageRequest {
            page: self.page,
            page_size,
            filters: self.filters.clone(),
        }
    }

    /// Whether the displayed page was full, i.e. another page may exist.
    fn has_more(&self, page_size: Option<usize>) -> bool {
        match (page_size, &self.displayed) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(size), Some(_)) => self.displayed_len >= size,
        }
    }

    fn displayed_page(&self) -> u32 {
        self.displayed
            .as_ref()
            .map_or(self.page, |request| request.page)
    }
}

pub struct ListViewController<S: ListSource> {
    guard: SessionGuard,
    source: S,
    state: Mutex<ListState<S::Item, S::Status>>,
}

impl<S: ListSource> ListViewController<S> {
    pub fn new(guard: SessionGuard, source: S) -> Self {
        Self {
            guard,
            source,
            state: Mutex::new(ListState {
                items: Vec::new(),
                total: 0,
                page: 1,
                filters: ListFilters::default(),
                search_draft: String::new(),
                phase: Phase::Idle,
                issued: 0,
                applied: 0,
                displayed: None,
                displayed_len: 0,
            }),
        }
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    pub const fn guard(&self) -> &SessionGuard {
        &self.guard
    }

    fn state(&self) -> MutexGuard<'_, ListState<S::Item, S::Status>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> ListSnapshot<S::Item, S::Status> {
        let state = self.state();
        ListSnapshot {
            items: state.items.clone(),
            total: state.total,
            page: state.page,
            filters: state.filters.clone(),
            search_draft: state.search_draft.clone(),
            phase: state.phase.clone(),
            has_more: state.has_more(self.source.page_size()),
        }
    }

    pub fn items(&self) -> Vec<S::Item> {
        self.state().items.clone()
    }

    pub fn phase(&self) -> Phase {
        self.state().phase.clone()
    }

    pub fn page(&self) -> u32 {
        self.state().page
    }

    /// Replaces filters and page without fetching, e.g. from command-line
    /// arguments before the first [`Self::refresh`].
    pub fn preset(&self, filters: ListFilters<S::Status>, page: u32) {
        let mut state = self.state();
        state.search_draft = filters.search.clone().unwrap_or_default();
        state.filters = filters;
        state.page = page.max(1);
    }

    /// Merges `update` into the filters.
    ///
    /// A status change resets to page 1 and fetches immediately; a search
    /// change only replaces the draft.
    pub async fn set_filter(&self, update: FilterUpdate<S::Status>) -> Result<FilterEffect> {
        let status_changed = {
            let mut state = self.state();
            if let Some(search) = update.search.as_ref() {
                state.search_draft.clone_from(search);
            }
            match update.status {
                Some(status) if status != state.filters.status => {
                    state.filters.status = status;
                    state.page = 1;
                    true
                }
                _ => false,
            }
        };

        if status_changed {
            self.refresh().await?;
            Ok(FilterEffect::Refetched)
        } else if update.search.is_some() {
            Ok(FilterEffect::Deferred)
        } else {
            Ok(FilterEffect::Unchanged)
        }
    }

    /// Updates the search draft without fetching.
    pub fn set_search_text(&self, text: impl Into<String>) {
        self.state().search_draft = text.into();
    }

    /// Commits the search draft, returns to page 1, and fetches.
    ///
    /// Returns `Ok(false)` without fetching when the committed search is
    /// already the one displayed. A failed list is always re-fetched.
    pub async fn submit_search(&self) -> Result<bool> {
        {
            let mut state = self.state();
            let committed = state.search_draft.trim().to_string();
            let committed = (!committed.is_empty()).then_some(committed);
            if committed == state.filters.search
                && state.displayed.is_some()
                && !state.phase.is_failed()
            {
                return Ok(false);
            }
            state.filters.search = committed;
            state.page = 1;
        }
        self.refresh().await?;
        Ok(true)
    }

    /// Moves to page `page` and fetches it.
    ///
    /// Returns `Ok(false)` without fetching when the page is known not to
    /// exist: the displayed page was short, or the list is unpaginated.
    pub async fn set_page(&self, page: u32) -> Result<bool> {
        if page == 0 {
            return Err(Error::Validation("Page numbers start at 1".to_string()));
        }

        {
            let mut state = self.state();
            let page_size = self.source.page_size();
            if page_size.is_none() && page > 1 {
                return Ok(false);
            }
            if page > state.displayed_page() && !state.has_more(page_size) {
                tracing::debug!("Rejecting page {} beyond the last page", page);
                return Ok(false);
            }
            if page == state.page && state.displayed.is_some() {
                return Ok(false);
            }
            state.page = page;
        }

        self.refresh().await?;
        Ok(true)
    }

    pub async fn next_page(&self) -> Result<bool> {
        let page = self.page();
        self.set_page(page.saturating_add(1)).await
    }

    pub async fn previous_page(&self) -> Result<bool> {
        let page = self.page();
        if page <= 1 {
            return Ok(false);
        }
        self.set_page(page - 1).await
    }

    /// Re-fetches with the current filters and page.
    pub async fn refresh(&self) -> Result<()> {
        let ticket = self.begin_refresh();
        self.complete(ticket).await
    }

    /// Issues a fetch for the current inputs and marks the list as loading.
    pub fn begin_refresh(&self) -> FetchTicket<S::Status> {
        let mut state = self.state();
        state.issued += 1;
        state.phase = Phase::Loading;
        FetchTicket {
            seq: state.issued,
            request: state.request(self.source.page_size()),
        }
    }

    /// Runs the fetch for `ticket` and applies it unless a newer response
    /// has already been applied.
    pub async fn complete(&self, ticket: FetchTicket<S::Status>) -> Result<()> {
        let FetchTicket { seq, request } = ticket;
        let source = &self.source;
        let request_ref = &request;
        tracing::debug!(
            "Fetching page {} (seq {}, filters {:?})",
            request.page,
            seq,
            request.filters
        );
        let outcome = self
            .guard
            .call(|token| async move { source.fetch(&token, request_ref).await })
            .await;

        let mut state = self.state();
        if seq <= state.applied {
            tracing::debug!("Discarding stale response (seq {} <= {})", seq, state.applied);
            return match outcome {
                Err(Error::SessionInvalid) => Err(Error::SessionInvalid),
                _ => Ok(()),
            };
        }

        state.applied = seq;
        let superseded = seq < state.issued;
        match outcome {
            Ok(page) => {
                state.displayed_len = page.items.len();
                state.items = page.items;
                state.total = page.total;
                state.displayed = Some(request);
                state.phase = if superseded {
                    Phase::Loading
                } else {
                    Phase::Ready
                };
                Ok(())
            }
            Err(error) => {
                state.phase = if superseded {
                    Phase::Loading
                } else {
                    Phase::Failed(error.to_string())
                };
                Err(error)
            }
        }
    }
}
