//! Holdings as served by `/transactions/holdings`.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A quantity of one symbol owned by the user.
///
/// `current_value` is computed by the backend as `balance × current_price`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    #[serde(default)]
    pub id: Option<u64>,
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    pub balance: Decimal,
    #[serde(default)]
    pub current_price: Option<Decimal>,
    #[serde(default)]
    pub current_value: Option<Decimal>,
    #[serde(default, with = "super::local_time")]
    pub last_updated: Option<NaiveDateTime>,
}

impl Holding {
    /// Returns `true` when the holding should be displayed.
    pub fn is_open(&self) -> bool {
        self.balance > Decimal::ZERO
    }

    /// Label for selectors: `"Bitcoin (XBT/USD)"` or just the symbol.
    pub fn label(&self) -> String {
        match self.name.as_deref() {
            Some(name) if name != self.symbol => format!("{name} ({})", self.symbol),
            _ => self.symbol.clone(),
        }
    }
}
