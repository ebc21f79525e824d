//! Transaction history with live profit/loss.
//!
//! Profit/loss for a buy is `(latest streamed price − purchase price) ×
//! amount`. Sells are already realized and are never recomputed.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::{FetchGuard, FetchTicket};
use crate::Result;
use crate::api::TradingApi;
use crate::format::{NOT_AVAILABLE, format_signed_currency};
use crate::models::{PriceMessage, Transaction, TransactionType};
use crate::sort::{SortConfig, SortDirection, SortValue, Sortable, sorted};

/// Sortable columns of the history table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionColumn {
    Id,
    Date,
    Type,
    Symbol,
    Amount,
    Price,
    Total,
}

impl TransactionColumn {
    /// Columns in display order.
    pub const ALL: [Self; 7] = [
        Self::Id,
        Self::Date,
        Self::Type,
        Self::Symbol,
        Self::Amount,
        Self::Price,
        Self::Total,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Id => "ID",
            Self::Date => "Date",
            Self::Type => "Type",
            Self::Symbol => "Symbol",
            Self::Amount => "Amount",
            Self::Price => "Price",
            Self::Total => "Total",
        }
    }
}

impl Sortable for Transaction {
    type Key = TransactionColumn;

    fn sort_value(&self, key: TransactionColumn) -> SortValue {
        match key {
            TransactionColumn::Id => Decimal::from(self.id).into(),
            TransactionColumn::Date => self.transaction_date.into(),
            TransactionColumn::Type => self.transaction_type.as_str().into(),
            TransactionColumn::Symbol => self.crypto_symbol.as_str().into(),
            TransactionColumn::Amount => self.amount.into(),
            TransactionColumn::Price => self.price.into(),
            TransactionColumn::Total => self.total_value.into(),
        }
    }
}

/// Profit/loss of one history row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfitLoss {
    /// Unrealized gain (positive) or loss (negative) of a buy.
    Unrealized(Decimal),
    /// No streamed price for the symbol yet, or the amount is out of range.
    Pending,
    /// A sell; the result was realized at execution.
    Realized,
}

impl ProfitLoss {
    pub fn label(&self) -> String {
        match self {
            Self::Unrealized(amount) => format_signed_currency(*amount),
            Self::Pending => NOT_AVAILABLE.to_string(),
            Self::Realized => "Realized".to_string(),
        }
    }
}

/// State of the transaction history page.
#[derive(Debug, Clone)]
pub struct TransactionHistory {
    transactions: Vec<Transaction>,
    latest_prices: HashMap<String, Decimal>,
    pub sort: SortConfig<TransactionColumn>,
    loading: bool,
    error: Option<String>,
    guard: FetchGuard,
}

impl Default for TransactionHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionHistory {
    /// Creates an empty history sorted newest first.
    pub fn new() -> Self {
        Self {
            transactions: Vec::new(),
            latest_prices: HashMap::new(),
            sort: SortConfig::new(TransactionColumn::Date, SortDirection::Descending),
            loading: true,
            error: None,
            guard: FetchGuard::default(),
        }
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.guard.begin()
    }

    /// Applies a load result. Failures keep the previous rows.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<Vec<Transaction>>) {
        if !self.guard.accepts(ticket) {
            debug!("Discarding stale history fetch");
            return;
        }
        self.loading = false;

        match result {
            Ok(transactions) => {
                self.transactions = transactions;
                self.error = None;
            }
            Err(e) => {
                warn!("Failed to load transactions: {e}");
                self.error = Some(format!(
                    "Failed to load transaction history: {}",
                    e.user_message()
                ));
            }
        }
    }

    /// Fetches and applies in one step.
    pub async fn refresh<A: TradingApi>(&mut self, api: &A) {
        let ticket = self.begin_fetch();
        let result = api.transactions().await;
        self.finish_fetch(ticket, result);
    }

    /// Records streamed prices for profit/loss.
    ///
    /// Snapshots replace the price map; deltas update one symbol.
    pub fn apply_prices(&mut self, message: &PriceMessage) {
        if let PriceMessage::Snapshot(quotes) = message {
            if quotes.is_empty() {
                return;
            }
            self.latest_prices.clear();
        }
        for quote in message.quotes() {
            if let Some(price) = quote.price {
                self.latest_prices.insert(quote.symbol.clone(), price);
            }
        }
    }

    pub fn mount(&mut self) {
        self.guard.mount();
    }

    pub fn unmount(&mut self) {
        self.guard.unmount();
    }

    pub fn request_sort(&mut self, column: TransactionColumn) {
        self.sort.request(column);
    }

    /// Rows in display order.
    pub fn rows(&self) -> Vec<&Transaction> {
        sorted(&self.transactions, &self.sort)
    }

    pub fn latest_price(&self, symbol: &str) -> Option<Decimal> {
        self.latest_prices.get(symbol).copied()
    }

    pub fn profit_loss(&self, transaction: &Transaction) -> ProfitLoss {
        match transaction.transaction_type {
            TransactionType::Sell => ProfitLoss::Realized,
            TransactionType::Buy => match self.latest_price(&transaction.crypto_symbol) {
                Some(current) => current
                    .checked_sub(transaction.price)
                    .and_then(|delta| delta.checked_mul(transaction.amount))
                    .map_or(ProfitLoss::Pending, ProfitLoss::Unrealized),
                None => ProfitLoss::Pending,
            },
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
