//! Holdings page: open positions, portfolio value and total assets.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{FetchGuard, FetchTicket};
use crate::Result;
use crate::api::TradingApi;
use crate::models::Holding;

/// One load of the holdings page.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub holdings: Vec<Holding>,
    pub balance: Decimal,
}

impl Portfolio {
    /// Fetches holdings, then the cash balance.
    ///
    /// # Errors
    ///
    /// Returns the first request error.
    pub async fn fetch<A: TradingApi>(api: &A) -> Result<Self> {
        let holdings = api.holdings().await?;
        let balance = api.balance().await?;
        Ok(Self { holdings, balance })
    }
}

/// State of the holdings page.
#[derive(Debug, Clone)]
pub struct HoldingsView {
    holdings: Vec<Holding>,
    balance: Option<Decimal>,
    loading: bool,
    error: Option<String>,
    guard: FetchGuard,
}

impl Default for HoldingsView {
    fn default() -> Self {
        Self::new()
    }
}

impl HoldingsView {
    pub fn new() -> Self {
        Self {
            holdings: Vec::new(),
            balance: None,
            loading: true,
            error: None,
            guard: FetchGuard::default(),
        }
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.guard.begin()
    }

    /// Applies a load result. Failures keep the previous rows.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<Portfolio>) {
        if !self.guard.accepts(ticket) {
            debug!("Discarding stale holdings fetch");
            return;
        }
        self.loading = false;

        match result {
            Ok(portfolio) => {
                let mut open: Vec<Holding> =
                    portfolio.holdings.into_iter().filter(Holding::is_open).collect();
                open.sort_by(|a, b| {
                    let a = a.current_value.unwrap_or(Decimal::ZERO);
                    let b = b.current_value.unwrap_or(Decimal::ZERO);
                    b.cmp(&a)
                });
                self.holdings = open;
                self.balance = Some(portfolio.balance);
                self.error = None;
            }
            Err(e) => {
                warn!("Failed to load holdings: {e}");
                self.error = Some(format!("Failed to load data: {}", e.user_message()));
            }
        }
    }

    /// Fetches and applies in one step.
    pub async fn refresh<A: TradingApi>(&mut self, api: &A) {
        let ticket = self.begin_fetch();
        let result = Portfolio::fetch(api).await;
        self.finish_fetch(ticket, result);
    }

    pub fn mount(&mut self) {
        self.guard.mount();
    }

    pub fn unmount(&mut self) {
        self.guard.unmount();
    }

    /// Open holdings, most valuable first.
    pub fn rows(&self) -> &[Holding] {
        &self.holdings
    }

    /// Cash balance.
    pub fn balance(&self) -> Option<Decimal> {
        self.balance
    }

    /// Sum of the current value of every open holding, saturating at the
    /// `Decimal` range.
    pub fn total_value(&self) -> Decimal {
        self.holdings
            .iter()
            .filter_map(|h| h.current_value)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Cash balance plus holdings value.
    pub fn total_assets(&self) -> Decimal {
        self.balance
            .unwrap_or(Decimal::ZERO)
            .saturating_add(self.total_value())
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
