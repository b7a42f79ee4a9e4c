use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::api::{ApiResult, DashboardApi};
use crate::error::Result;
use crate::list_view::{ListPage, ListSource, ListViewController, NoStatus, PageRequest};
use crate::models::{average_apy, format_percentage, BusLockBalance, TreasuryPosition};
use crate::session::SessionGuard;

/// `GET treasury/positions`; the endpoint is unpaginated.
#[derive(Debug, Clone)]
pub struct PositionSource<A> {
    api: A,
}

impl<A: DashboardApi> ListSource for PositionSource<A> {
    type Item = TreasuryPosition;
    type Status = NoStatus;

    fn page_size(&self) -> Option<usize> {
        None
    }

    async fn fetch(
        &self,
        token: &str,
        _request: &PageRequest<NoStatus>,
    ) -> ApiResult<ListPage<TreasuryPosition>> {
        self.api.list_positions(token).await.map(ListPage::complete)
    }
}

/// Figures shown above the positions table.
#[derive(Debug, Clone, PartialEq)]
pub struct TreasurySummary {
    /// From the portfolio endpoint, not summed client-side
    pub total_value: Option<f64>,
    pub average_apy: f64,
    pub position_count: usize,
    pub bus_lock: Option<BusLockBalance>,
}

impl TreasurySummary {
    #[must_use]
    pub fn average_apy_display(&self) -> String {
        format_percentage(self.average_apy)
    }
}

#[derive(Default)]
struct Aggregates {
    total_value: Option<f64>,
    bus_lock: Option<BusLockBalance>,
}

pub struct TreasuryPage<A: DashboardApi> {
    api: A,
    positions: ListViewController<PositionSource<A>>,
    aggregates: Mutex<Aggregates>,
}

impl<A: DashboardApi + Clone> TreasuryPage<A> {
    pub fn new(guard: SessionGuard, api: A) -> Self {
        Self {
            positions: ListViewController::new(guard, PositionSource { api: api.clone() }),
            api,
            aggregates: Mutex::new(Aggregates::default()),
        }
    }

    pub const fn positions(&self) -> &ListViewController<PositionSource<A>> {
        &self.positions
    }

    fn aggregates(&self) -> MutexGuard<'_, Aggregates> {
        self.aggregates
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Reloads positions, the portfolio total, and the bus-lock balance.
    ///
    /// Stops at the first failure; figures already loaded are kept.
    pub async fn refresh(&self) -> Result<()> {
        self.positions.refresh().await?;

        let api = &self.api;
        let guard = self.positions.guard();
        let portfolio = guard
            .call(|token| async move { api.portfolio_summary(&token).await })
            .await?;
        self.aggregates().total_value = Some(portfolio.total_value);

        let bus_lock = guard
            .call(|token| async move { api.bus_lock_balance(&token).await })
            .await?;
        self.aggregates().bus_lock = Some(bus_lock);
        Ok(())
    }

    /// Aggregates over the currently loaded positions.
    pub fn summary(&self) -> TreasurySummary {
        let positions = self.positions.items();
        let aggregates = self.aggregates();
        TreasurySummary {
            total_value: aggregates.total_value,
            average_apy: average_apy(&positions),
            position_count: positions.len(),
            bus_lock: aggregates.bus_lock.clone(),
        }
    }
}
