//! Transaction history, trade requests, balance and reset payloads.

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of a completed trade.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Buy,
    Sell,
}

impl TransactionType {
    /// Returns the wire name (`"BUY"` / `"SELL"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the user's transaction history.
///
/// Immutable once created; `id` is assigned by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: u64,
    pub crypto_symbol: String,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    /// Unit price at execution.
    pub price: Decimal,
    pub total_value: Decimal,
    #[serde(default, with = "super::local_time")]
    pub transaction_date: Option<NaiveDateTime>,
}

/// Body of `POST /transactions/buy` and `/transactions/sell`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeRequest {
    pub symbol: String,
    /// Sent as a JSON number, as the backend's validator expects.
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
}

impl TradeRequest {
    pub fn new(symbol: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
        }
    }
}

/// Body of `GET /transactions/balance`.
///
/// The backend answers `{ "balance": … }` on success and
/// `{ "error": … }` when the lookup failed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BalanceResponse {
    #[serde(default)]
    pub balance: Option<Decimal>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of a successful `POST /transactions/reset`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResetConfirmation {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub balance: Option<Decimal>,
}
