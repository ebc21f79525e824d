//! Live price table.
//!
//! Quotes are kept in arrival order; snapshots replace the whole set and
//! deltas update one symbol in place (or append it when it is new).

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{FetchGuard, FetchTicket};
use crate::Result;
use crate::models::{PriceMessage, PriceQuote};
use crate::sort::{SortConfig, SortDirection, SortValue, Sortable, sorted};

/// Sortable columns of the price table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PriceColumn {
    Symbol,
    Name,
    Price,
    Ask,
    Bid,
    Volume,
    LastUpdated,
}

impl PriceColumn {
    /// Columns in display order.
    pub const ALL: [Self; 7] = [
        Self::Symbol,
        Self::Name,
        Self::Price,
        Self::Ask,
        Self::Bid,
        Self::Volume,
        Self::LastUpdated,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Symbol => "Symbol",
            Self::Name => "Name",
            Self::Price => "Price",
            Self::Ask => "Ask",
            Self::Bid => "Bid",
            Self::Volume => "Volume (24h)",
            Self::LastUpdated => "Last Updated",
        }
    }
}

impl Sortable for PriceQuote {
    type Key = PriceColumn;

    fn sort_value(&self, key: PriceColumn) -> SortValue {
        match key {
            PriceColumn::Symbol => self.symbol.as_str().into(),
            PriceColumn::Name => self.name.as_deref().into(),
            PriceColumn::Price => self.price.into(),
            PriceColumn::Ask => self.ask_price.into(),
            PriceColumn::Bid => self.bid_price.into(),
            PriceColumn::Volume => self.volume_24h.into(),
            PriceColumn::LastUpdated => self.last_updated.into(),
        }
    }
}

/// State of the live price table.
#[derive(Debug, Clone)]
pub struct PriceTable {
    quotes: Vec<PriceQuote>,
    pub sort: SortConfig<PriceColumn>,
    loading: bool,
    error: Option<String>,
    guard: FetchGuard,
}

impl Default for PriceTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceTable {
    /// Creates an empty table sorted by price, highest first.
    pub fn new() -> Self {
        Self {
            quotes: Vec::new(),
            sort: SortConfig::new(PriceColumn::Price, SortDirection::Descending),
            loading: true,
            error: None,
            guard: FetchGuard::default(),
        }
    }

    /// Applies a stream message.
    ///
    /// An empty snapshot is ignored so a transient empty broadcast does not
    /// blank the table.
    pub fn apply(&mut self, message: &PriceMessage) {
        match message {
            PriceMessage::Snapshot(quotes) if quotes.is_empty() => {
                debug!("Ignoring empty price snapshot");
            }
            PriceMessage::Snapshot(quotes) => {
                self.quotes = quotes.clone();
                self.loading = false;
                self.error = None;
            }
            PriceMessage::Delta(quote) => {
                self.upsert(quote.clone());
                self.loading = false;
                self.error = None;
            }
        }
    }

    fn upsert(&mut self, quote: PriceQuote) {
        match self.quotes.iter_mut().find(|q| q.symbol == quote.symbol) {
            Some(existing) => *existing = quote,
            None => self.quotes.push(quote),
        }
    }

    /// Starts the initial REST load.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.loading = self.quotes.is_empty();
        self.guard.begin()
    }

    /// Applies the result of the REST load started with `ticket`.
    ///
    /// Stale results are dropped. A failure only surfaces while the table
    /// is still empty.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<PriceQuote>>) {
        if !self.guard.accepts(ticket) {
            debug!("Discarding stale price fetch");
            return;
        }
        match result {
            Ok(quotes) => self.apply(&PriceMessage::Snapshot(quotes)),
            Err(e) => {
                warn!("Failed to load prices: {e}");
                if self.quotes.is_empty() {
                    self.error = Some(format!("Failed to load prices: {}", e.user_message()));
                }
            }
        }
        self.loading = false;
    }

    pub fn mount(&mut self) {
        self.guard.mount();
    }

    pub fn unmount(&mut self) {
        self.guard.unmount();
    }

    /// Applies a header click on `column`.
    pub fn request_sort(&mut self, column: PriceColumn) {
        self.sort.request(column);
    }

    /// Rows in display order.
    pub fn rows(&self) -> Vec<&PriceQuote> {
        sorted(&self.quotes, &self.sort)
    }

    /// Quotes in arrival order.
    pub fn quotes(&self) -> &[PriceQuote] {
        &self.quotes
    }

    pub fn quote(&self, symbol: &str) -> Option<&PriceQuote> {
        self.quotes.iter().find(|q| q.symbol == symbol)
    }

    pub fn latest_price(&self, symbol: &str) -> Option<Decimal> {
        self.quote(symbol).and_then(|q| q.price)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
