//! Price quotes as served by `/crypto/prices` and the `/topic/prices` stream.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Latest market data for one trading pair.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    /// Pair symbol, e.g. `"XBT/USD"`. Unique key of the price set.
    pub symbol: String,
    /// Display name, e.g. `"Bitcoin"`.
    #[serde(default)]
    pub name: Option<String>,
    /// Last traded price.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub ask_price: Option<Decimal>,
    #[serde(default)]
    pub bid_price: Option<Decimal>,
    #[serde(default, rename = "volume24h")]
    pub volume_24h: Option<Decimal>,
    #[serde(default, with = "super::local_time")]
    pub last_updated: Option<NaiveDateTime>,
}

impl PriceQuote {
    /// Creates a quote with only a symbol and last price set.
    pub fn new(symbol: impl Into<String>, price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            price: Some(price),
            ask_price: None,
            bid_price: None,
            volume_24h: None,
            last_updated: None,
        }
    }

    /// Relative bid/ask spread in percent, if both sides are quoted, the
    /// bid is non-zero and the result fits a `Decimal`.
    pub fn spread_pct(&self) -> Option<Decimal> {
        let ask = self.ask_price?;
        let bid = self.bid_price?;
        if bid.is_zero() {
            return None;
        }
        ask.checked_sub(bid)?
            .checked_div(bid)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    /// Classifies the spread for highlighting.
    pub fn spread_state(&self) -> SpreadState {
        match self.spread_pct() {
            Some(pct) if pct > Decimal::ONE => SpreadState::Wide,
            Some(pct) if pct < -Decimal::ONE => SpreadState::Inverted,
            _ => SpreadState::Normal,
        }
    }
}

/// Spread classification used to colour price rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpreadState {
    #[default]
    Normal,
    /// Ask more than 1% above bid.
    Wide,
    /// Ask more than 1% below bid.
    Inverted,
}

/// Payload of a message on the price topic.
///
/// The backend publishes the whole price set after `subscribe-all` and on
/// its periodic broadcast, and single quotes as they change.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PriceMessage {
    /// Full replacement of the price set.
    Snapshot(Vec<PriceQuote>),
    /// Update for a single symbol.
    Delta(PriceQuote),
}

impl PriceMessage {
    /// Number of quotes carried by the message.
    pub fn len(&self) -> usize {
        match self {
            Self::Snapshot(quotes) => quotes.len(),
            Self::Delta(_) => 1,
        }
    }

    /// Returns `true` for an empty snapshot.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the quotes carried by the message.
    pub fn quotes(&self) -> impl Iterator<Item = &PriceQuote> {
        let slice = match self {
            Self::Snapshot(quotes) => quotes.as_slice(),
            Self::Delta(quote) => std::slice::from_ref(quote),
        };
        slice.iter()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn spread_classification() {
        let mut quote = PriceQuote::new("XBT/USD", dec!(50000));
        assert_eq!(quote.spread_state(), SpreadState::Normal);

        quote.bid_price = Some(dec!(100));
        quote.ask_price = Some(dec!(102));
        assert_eq!(quote.spread_pct(), Some(dec!(2)));
        assert_eq!(quote.spread_state(), SpreadState::Wide);

        quote.ask_price = Some(dec!(98));
        assert_eq!(quote.spread_state(), SpreadState::Inverted);

        quote.ask_price = Some(dec!(100.5));
        assert_eq!(quote.spread_state(), SpreadState::Normal);
    }

    #[test]
    fn zero_bid_has_no_spread() {
        let mut quote = PriceQuote::new("DOGE/USD", dec!(0.1));
        quote.bid_price = Some(Decimal::ZERO);
        quote.ask_price = Some(dec!(0.1));
        assert_eq!(quote.spread_pct(), None);
    }

    #[test]
    fn out_of_range_spread_is_normal() {
        let mut quote = PriceQuote::new("XBT/USD", dec!(50000));
        quote.bid_price = Some(dec!(0.0001));
        quote.ask_price = Some(Decimal::MAX);
        assert_eq!(quote.spread_pct(), None);
        assert_eq!(quote.spread_state(), SpreadState::Normal);

        quote.bid_price = Some(Decimal::MAX);
        quote.ask_price = Some(Decimal::MIN);
        assert_eq!(quote.spread_pct(), None);
    }
}
