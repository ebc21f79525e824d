//! Buy and sell forms.
//!
//! Both forms run the same cycle: `Idle → Validating → Submitting →
//! Succeeded | Failed`, and back to `Idle` once the outcome has been shown.
//! Validation happens before any request. After a confirmed trade the
//! balance (and, for sells, the holdings) is re-fetched before success is
//! reported, so the form never shows a pre-trade balance next to a success
//! message. On failure the entered quantity is kept.
//!
//! A submission is split in three steps so the request can run off the UI
//! loop: `begin_submit` validates and marks the form busy, `place` talks to
//! the backend without touching the form, and `finish_submit` applies the
//! outcome. `submit` chains the three.

use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::{FetchGuard, FetchTicket, QuantityInput};
use crate::Result;
use crate::api::TradingApi;
use crate::format::format_currency;
use crate::models::{Holding, PriceMessage, PriceQuote, TradeRequest, Transaction};

/// Symbol the buy form selects when it is listed.
pub const DEFAULT_BUY_SYMBOL: &str = "XBT/USD";

/// Why a trade was refused before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TradeRejection {
    /// Quantity missing, unparsable, zero or negative.
    #[error("Please enter a valid quantity.")]
    InvalidQuantity,

    /// `quantity × price` exceeds the cash balance.
    #[error("Insufficient balance to complete this purchase.")]
    InsufficientBalance { cost: Decimal, available: Decimal },

    /// Sell quantity exceeds the held amount.
    #[error("You can only sell up to {held} {symbol}")]
    ExceedsHolding { held: Decimal, symbol: String },

    /// No symbol is selected.
    #[error("Please select a cryptocurrency.")]
    NoSelection,
}

/// Progress of a buy or sell submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TradeState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded(String),
    Failed(String),
}

impl TradeState {
    /// Returns `true` while a submission is in progress.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Validating | Self::Submitting)
    }

    /// Outcome message, if one is being shown.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Succeeded(msg) | Self::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// Returns to `Idle` after the outcome was displayed.
    pub fn acknowledge(&mut self) {
        if !self.is_busy() {
            *self = Self::Idle;
        }
    }
}

/// A validated trade on its way to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTrade {
    pub request: TradeRequest,
    /// Quantity as the user typed it, for the outcome message.
    shown_quantity: String,
}

/// Backend state after a confirmed purchase.
#[derive(Debug, Clone, PartialEq)]
pub struct BuyReceipt {
    pub transaction: Transaction,
    pub balance: Decimal,
}

/// Backend state after a confirmed sale.
#[derive(Debug, Clone, PartialEq)]
pub struct SellReceipt {
    pub transaction: Transaction,
    pub balance: Decimal,
    pub holdings: Vec<Holding>,
}

/// Parses a quantity field; only strictly positive decimals are valid.
pub fn parse_quantity(text: &str) -> std::result::Result<Decimal, TradeRejection> {
    let text = text.trim();
    match Decimal::from_str(text) {
        Ok(quantity) if quantity > Decimal::ZERO => Ok(quantity),
        _ => Err(TradeRejection::InvalidQuantity),
    }
}

/// `quantity × price` for a parsable quantity, `None` when either is
/// missing or the product overflows.
fn trade_total(quantity: &str, price: Option<Decimal>) -> Option<Decimal> {
    parse_quantity(quantity).ok()?.checked_mul(price?)
}

/// Chooses `current` when it is still offered, else `preferred`, else the
/// first offered symbol.
fn reselect<'a>(
    offered: impl Iterator<Item = &'a str> + Clone,
    current: Option<&str>,
    preferred: Option<&str>,
) -> Option<String> {
    let contains = |wanted: &str| offered.clone().any(|s| s == wanted);
    current
        .filter(|s| contains(*s))
        .or_else(|| preferred.filter(|s| contains(*s)))
        .or_else(|| offered.clone().next())
        .map(String::from)
}

// -- Buy --

/// State of the buy page.
#[derive(Debug, Clone)]
pub struct BuyForm {
    available: Vec<PriceQuote>,
    symbol: Option<String>,
    balance: Option<Decimal>,
    pub quantity: QuantityInput,
    state: TradeState,
    load_error: Option<String>,
    loading: bool,
    guard: FetchGuard,
}

impl Default for BuyForm {
    fn default() -> Self {
        Self::new()
    }
}

impl BuyForm {
    pub fn new() -> Self {
        Self {
            available: Vec::new(),
            symbol: Some(DEFAULT_BUY_SYMBOL.to_string()),
            balance: None,
            quantity: QuantityInput::new(),
            state: TradeState::Idle,
            load_error: None,
            loading: true,
            guard: FetchGuard::default(),
        }
    }

    pub fn begin_load(&mut self) -> FetchTicket {
        self.loading = true;
        self.guard.begin()
    }

    /// Applies the tradable quotes and the cash balance loaded for `ticket`.
    pub fn finish_load(
        &mut self,
        ticket: FetchTicket,
        prices: Result<Vec<PriceQuote>>,
        balance: Result<Decimal>,
    ) {
        if !self.guard.accepts(ticket) {
            debug!("Discarding stale buy form load");
            return;
        }
        self.loading = false;
        self.load_error = None;

        match prices {
            Ok(quotes) => {
                self.available = quotes;
                self.symbol = reselect(
                    self.available.iter().map(|q| q.symbol.as_str()),
                    self.symbol.as_deref(),
                    Some(DEFAULT_BUY_SYMBOL),
                );
            }
            Err(e) => {
                warn!("Failed to load tradable prices: {e}");
                self.load_error = Some("Failed to load cryptocurrencies. Please try again.".into());
            }
        }

        match balance {
            Ok(balance) => self.balance = Some(balance),
            Err(e) => {
                warn!("Failed to load balance: {e}");
                self.load_error = Some(format!(
                    "Failed to load user balance: {}",
                    e.user_message()
                ));
            }
        }
    }

    /// Keeps listed prices current from the stream.
    pub fn apply_prices(&mut self, message: &PriceMessage) {
        for quote in message.quotes() {
            if let Some(existing) = self.available.iter_mut().find(|q| q.symbol == quote.symbol) {
                *existing = quote.clone();
            }
        }
    }

    pub fn mount(&mut self) {
        self.guard.mount();
    }

    pub fn unmount(&mut self) {
        self.guard.unmount();
    }

    // -- Selection --

    pub fn available(&self) -> &[PriceQuote] {
        &self.available
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Selects `symbol`; the current price follows the selection.
    pub fn select(&mut self, symbol: &str) {
        self.symbol = Some(symbol.to_string());
    }

    /// Moves the selection by `offset` through the listed symbols, wrapping.
    pub fn cycle(&mut self, offset: isize) {
        if let Some(next) = cycle_symbol(
            self.available.iter().map(|q| q.symbol.as_str()),
            self.symbol.as_deref(),
            offset,
        ) {
            self.select(&next);
        }
    }

    pub fn current_price(&self) -> Option<Decimal> {
        let symbol = self.symbol.as_deref()?;
        self.available
            .iter()
            .find(|q| q.symbol == symbol)
            .and_then(|q| q.price)
    }

    pub fn balance(&self) -> Option<Decimal> {
        self.balance
    }

    /// `quantity × current price`, zero while either is unknown or the
    /// product does not fit a `Decimal`.
    pub fn total_cost(&self) -> Decimal {
        trade_total(self.quantity.as_str(), self.current_price()).unwrap_or(Decimal::ZERO)
    }

    pub fn state(&self) -> &TradeState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TradeState {
        &mut self.state
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Checks the form without sending anything.
    pub fn validate(&self) -> std::result::Result<TradeRequest, TradeRejection> {
        let quantity = parse_quantity(self.quantity.as_str())?;
        let symbol = self.symbol.clone().ok_or(TradeRejection::NoSelection)?;

        let available = self.balance.unwrap_or(Decimal::ZERO);
        // An unknown price costs nothing; a product past Decimal::MAX is
        // more than any balance.
        let cost = match self.current_price() {
            Some(price) => quantity.checked_mul(price).unwrap_or(Decimal::MAX),
            None => Decimal::ZERO,
        };
        if cost > available {
            return Err(TradeRejection::InsufficientBalance { cost, available });
        }

        Ok(TradeRequest::new(symbol, quantity))
    }

    /// Validates the form and marks it as submitting.
    ///
    /// # Errors
    ///
    /// Returns the local rejection; the state then holds its message and
    /// nothing should be sent.
    pub fn begin_submit(&mut self) -> std::result::Result<PendingTrade, TradeRejection> {
        match self.validate() {
            Ok(request) => {
                self.state = TradeState::Submitting;
                Ok(PendingTrade {
                    request,
                    shown_quantity: self.quantity.as_str().trim().to_string(),
                })
            }
            Err(rejection) => {
                debug!(%rejection, "Buy rejected locally");
                self.state = TradeState::Failed(rejection.to_string());
                Err(rejection)
            }
        }
    }

    /// Sends the purchase and re-reads the balance.
    ///
    /// # Errors
    ///
    /// Returns the first failed request.
    pub async fn place<A: TradingApi>(api: &A, request: &TradeRequest) -> Result<BuyReceipt> {
        let transaction = api.buy(request).await?;
        let balance = api.balance().await?;
        Ok(BuyReceipt {
            transaction,
            balance,
        })
    }

    /// Applies the outcome of [`place`](Self::place).
    ///
    /// # Errors
    ///
    /// Passes the request error through; the quantity is kept and the state
    /// holds the message.
    pub fn finish_submit(
        &mut self,
        pending: PendingTrade,
        outcome: Result<BuyReceipt>,
    ) -> Result<Transaction> {
        let PendingTrade {
            request,
            shown_quantity,
        } = pending;
        match outcome {
            Ok(receipt) => {
                info!(symbol = %request.symbol, quantity = %request.quantity, "Purchase completed");
                self.balance = Some(receipt.balance);
                self.quantity.clear();
                self.state = TradeState::Succeeded(format!(
                    "Successfully purchased {shown_quantity} {}!",
                    request.symbol
                ));
                Ok(receipt.transaction)
            }
            Err(e) => {
                warn!("Purchase failed: {e}");
                self.state = TradeState::Failed(format!(
                    "Failed to complete purchase: {}",
                    e.user_message()
                ));
                Err(e)
            }
        }
    }

    /// Validates and submits the purchase, then refreshes the balance.
    ///
    /// # Errors
    ///
    /// Returns [`CoinsimError::Validation`](crate::CoinsimError::Validation)
    /// when the form is refused locally, or the request error otherwise. In
    /// both cases the quantity is kept and the state holds the message.
    pub async fn submit<A: TradingApi>(&mut self, api: &A) -> Result<Transaction> {
        let pending = self.begin_submit()?;
        let outcome = Self::place(api, &pending.request).await;
        self.finish_submit(pending, outcome)
    }
}

// -- Sell --

/// State of the sell page.
#[derive(Debug, Clone, Default)]
pub struct SellForm {
    holdings: Vec<Holding>,
    symbol: Option<String>,
    balance: Option<Decimal>,
    pub quantity: QuantityInput,
    state: TradeState,
    load_error: Option<String>,
    loading: bool,
    guard: FetchGuard,
}

impl SellForm {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn begin_load(&mut self) -> FetchTicket {
        self.loading = true;
        self.guard.begin()
    }

    /// Applies the holdings and cash balance loaded for `ticket`.
    pub fn finish_load(
        &mut self,
        ticket: FetchTicket,
        holdings: Result<Vec<Holding>>,
        balance: Result<Decimal>,
    ) {
        if !self.guard.accepts(ticket) {
            debug!("Discarding stale sell form load");
            return;
        }
        self.loading = false;
        self.load_error = None;

        match holdings {
            Ok(holdings) => self.set_holdings(holdings),
            Err(e) => {
                warn!("Failed to load holdings: {e}");
                self.load_error = Some("Failed to load crypto holdings. Please try again.".into());
            }
        }

        match balance {
            Ok(balance) => self.balance = Some(balance),
            Err(e) => {
                warn!("Failed to load balance: {e}");
                self.load_error = Some(format!(
                    "Failed to load user balance: {}",
                    e.user_message()
                ));
            }
        }
    }

    /// Replaces the holdings, keeping the selection if it is still held.
    fn set_holdings(&mut self, holdings: Vec<Holding>) {
        self.holdings = holdings.into_iter().filter(Holding::is_open).collect();
        self.symbol = reselect(
            self.holdings.iter().map(|h| h.symbol.as_str()),
            self.symbol.as_deref(),
            None,
        );
    }

    pub fn mount(&mut self) {
        self.guard.mount();
    }

    pub fn unmount(&mut self) {
        self.guard.unmount();
    }

    // -- Selection --

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Selects `symbol` and clears the entered quantity.
    pub fn select(&mut self, symbol: &str) {
        if self.holdings.iter().any(|h| h.symbol == symbol) {
            self.symbol = Some(symbol.to_string());
            self.quantity.clear();
        }
    }

    /// Moves the selection by `offset` through the holdings, wrapping.
    pub fn cycle(&mut self, offset: isize) {
        if let Some(next) = cycle_symbol(
            self.holdings.iter().map(|h| h.symbol.as_str()),
            self.symbol.as_deref(),
            offset,
        ) {
            self.select(&next);
        }
    }

    fn selected(&self) -> Option<&Holding> {
        let symbol = self.symbol.as_deref()?;
        self.holdings.iter().find(|h| h.symbol == symbol)
    }

    /// Amount of the selected symbol currently held.
    pub fn held(&self) -> Option<Decimal> {
        self.selected().map(|h| h.balance)
    }

    pub fn current_price(&self) -> Option<Decimal> {
        self.selected().and_then(|h| h.current_price)
    }

    /// Fills the quantity with everything held.
    pub fn fill_max(&mut self) {
        if let Some(held) = self.held() {
            self.quantity.set(held.normalize().to_string());
        }
    }

    pub fn balance(&self) -> Option<Decimal> {
        self.balance
    }

    /// `quantity × current price`, zero while either is unknown or the
    /// product does not fit a `Decimal`.
    pub fn total_value(&self) -> Decimal {
        trade_total(self.quantity.as_str(), self.current_price()).unwrap_or(Decimal::ZERO)
    }

    pub fn state(&self) -> &TradeState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TradeState {
        &mut self.state
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Checks the form without sending anything.
    pub fn validate(&self) -> std::result::Result<TradeRequest, TradeRejection> {
        let quantity = parse_quantity(self.quantity.as_str())?;
        let symbol = self.symbol.clone().ok_or(TradeRejection::NoSelection)?;

        let held = self.held().unwrap_or(Decimal::ZERO);
        if quantity > held {
            return Err(TradeRejection::ExceedsHolding {
                held: held.normalize(),
                symbol,
            });
        }

        Ok(TradeRequest::new(symbol, quantity))
    }

    /// Validates the form and marks it as submitting.
    ///
    /// # Errors
    ///
    /// Same contract as [`BuyForm::begin_submit`].
    pub fn begin_submit(&mut self) -> std::result::Result<PendingTrade, TradeRejection> {
        match self.validate() {
            Ok(request) => {
                self.state = TradeState::Submitting;
                Ok(PendingTrade {
                    request,
                    shown_quantity: self.quantity.as_str().trim().to_string(),
                })
            }
            Err(rejection) => {
                debug!(%rejection, "Sell rejected locally");
                self.state = TradeState::Failed(rejection.to_string());
                Err(rejection)
            }
        }
    }

    /// Sends the sale and re-reads balance and holdings.
    ///
    /// # Errors
    ///
    /// Returns the first failed request.
    pub async fn place<A: TradingApi>(api: &A, request: &TradeRequest) -> Result<SellReceipt> {
        let transaction = api.sell(request).await?;
        let balance = api.balance().await?;
        let holdings = api.holdings().await?;
        Ok(SellReceipt {
            transaction,
            balance,
            holdings,
        })
    }

    /// Applies the outcome of [`place`](Self::place).
    ///
    /// # Errors
    ///
    /// Same contract as [`BuyForm::finish_submit`].
    pub fn finish_submit(
        &mut self,
        pending: PendingTrade,
        outcome: Result<SellReceipt>,
    ) -> Result<Transaction> {
        let PendingTrade {
            request,
            shown_quantity,
        } = pending;
        match outcome {
            Ok(receipt) => {
                info!(symbol = %request.symbol, quantity = %request.quantity, "Sale completed");
                self.balance = Some(receipt.balance);
                self.set_holdings(receipt.holdings);
                self.quantity.clear();
                self.state = TradeState::Succeeded(format!(
                    "Successfully sold {shown_quantity} {} for {}!",
                    request.symbol,
                    format_currency(Some(receipt.transaction.total_value))
                ));
                Ok(receipt.transaction)
            }
            Err(e) => {
                warn!("Sale failed: {e}");
                self.state = TradeState::Failed(format!(
                    "Failed to complete sale: {}",
                    e.user_message()
                ));
                Err(e)
            }
        }
    }

    /// Validates and submits the sale, then refreshes balance and holdings.
    ///
    /// # Errors
    ///
    /// Same contract as [`BuyForm::submit`].
    pub async fn submit<A: TradingApi>(&mut self, api: &A) -> Result<Transaction> {
        let pending = self.begin_submit()?;
        let outcome = Self::place(api, &pending.request).await;
        self.finish_submit(pending, outcome)
    }
}

fn cycle_symbol<'a>(
    symbols: impl Iterator<Item = &'a str>,
    current: Option<&str>,
    offset: isize,
) -> Option<String> {
    let symbols: Vec<&str> = symbols.collect();
    if symbols.is_empty() {
        return None;
    }
    let len = symbols.len() as isize;
    let index = current
        .and_then(|c| symbols.iter().position(|s| *s == c))
        .map_or(0, |i| (i as isize + offset).rem_euclid(len));
    Some(symbols[index as usize].to_string())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn holding(symbol: &str, balance: Decimal, price: Decimal) -> Holding {
        Holding {
            id: None,
            symbol: symbol.to_string(),
            name: None,
            balance,
            current_price: Some(price),
            current_value: Some(balance * price),
            last_updated: None,
        }
    }

    fn loaded_buy(balance: Decimal) -> BuyForm {
        let mut form = BuyForm::new();
        let ticket = form.begin_load();
        form.finish_load(
            ticket,
            Ok(vec![
                PriceQuote::new("ETH/USD", dec!(3000)),
                PriceQuote::new("XBT/USD", dec!(50000)),
            ]),
            Ok(balance),
        );
        form
    }

    #[test]
    fn quantity_parsing() {
        assert_eq!(parse_quantity(" 0.1 "), Ok(dec!(0.1)));
        for bad in ["", "0", "-1", "abc", "0.0"] {
            assert_eq!(parse_quantity(bad), Err(TradeRejection::InvalidQuantity), "{bad:?}");
        }
    }

    #[test]
    fn rejection_messages() {
        assert_eq!(
            TradeRejection::InvalidQuantity.to_string(),
            "Please enter a valid quantity."
        );
        assert_eq!(
            TradeRejection::InsufficientBalance {
                cost: dec!(2),
                available: dec!(1)
            }
            .to_string(),
            "Insufficient balance to complete this purchase."
        );
        assert_eq!(
            TradeRejection::ExceedsHolding {
                held: dec!(2),
                symbol: "ETH/USD".to_string()
            }
            .to_string(),
            "You can only sell up to 2 ETH/USD"
        );
    }

    #[test]
    fn buy_defaults_to_xbt_when_listed() {
        let form = loaded_buy(dec!(10000));
        assert_eq!(form.symbol(), Some("XBT/USD"));
        assert_eq!(form.current_price(), Some(dec!(50000)));
    }

    #[test]
    fn buy_falls_back_to_first_symbol() {
        let mut form = BuyForm::new();
        let ticket = form.begin_load();
        form.finish_load(
            ticket,
            Ok(vec![PriceQuote::new("ETH/USD", dec!(3000))]),
            Ok(dec!(1)),
        );
        assert_eq!(form.symbol(), Some("ETH/USD"));
    }

    #[test]
    fn buy_validation_checks_cost_against_balance() {
        let mut form = loaded_buy(dec!(10000));
        form.quantity.set("1");
        assert!(matches!(
            form.validate(),
            Err(TradeRejection::InsufficientBalance { .. })
        ));

        form.quantity.set("0.2");
        assert_eq!(form.total_cost(), dec!(10000));
        assert_eq!(form.validate(), Ok(TradeRequest::new("XBT/USD", dec!(0.2))));
    }

    #[test]
    fn huge_quantity_is_refused_not_overflowed() {
        let huge = "99999999999999999999999999";
        let mut form = loaded_buy(dec!(10000));
        form.quantity.set(huge);
        assert_eq!(form.total_cost(), Decimal::ZERO);
        assert_eq!(
            form.validate(),
            Err(TradeRejection::InsufficientBalance {
                cost: Decimal::MAX,
                available: dec!(10000)
            })
        );

        let mut sell = SellForm::new();
        let ticket = sell.begin_load();
        sell.finish_load(
            ticket,
            Ok(vec![holding("XBT/USD", dec!(1), dec!(50000))]),
            Ok(dec!(0)),
        );
        sell.quantity.set(huge);
        assert_eq!(sell.total_value(), Decimal::ZERO);
        assert!(matches!(
            sell.validate(),
            Err(TradeRejection::ExceedsHolding { .. })
        ));
    }

    #[test]
    fn buy_selection_changes_price() {
        let mut form = loaded_buy(dec!(10000));
        form.cycle(1);
        assert_eq!(form.symbol(), Some("ETH/USD"));
        assert_eq!(form.current_price(), Some(dec!(3000)));
        form.cycle(-1);
        assert_eq!(form.symbol(), Some("XBT/USD"));
    }

    #[test]
    fn buy_prices_follow_stream() {
        let mut form = loaded_buy(dec!(10000));
        form.apply_prices(&PriceMessage::Delta(PriceQuote::new("XBT/USD", dec!(40000))));
        assert_eq!(form.current_price(), Some(dec!(40000)));
    }

    #[test]
    fn sell_select_clears_quantity_and_fill_max() {
        let mut form = SellForm::new();
        let ticket = form.begin_load();
        form.finish_load(
            ticket,
            Ok(vec![
                holding("ETH/USD", dec!(2), dec!(3000)),
                holding("DOGE/USD", dec!(0), dec!(0.1)),
                holding("XBT/USD", dec!(0.5), dec!(50000)),
            ]),
            Ok(dec!(100)),
        );
        assert_eq!(form.holdings().len(), 2);
        assert_eq!(form.symbol(), Some("ETH/USD"));

        form.quantity.set("1");
        form.select("XBT/USD");
        assert!(form.quantity.is_empty());

        form.fill_max();
        assert_eq!(form.quantity.as_str(), "0.5");
        assert_eq!(form.total_value(), dec!(25000));
    }

    #[test]
    fn sell_validation_names_maximum() {
        let mut form = SellForm::new();
        let ticket = form.begin_load();
        form.finish_load(
            ticket,
            Ok(vec![holding("ETH/USD", dec!(2.00000000), dec!(3000))]),
            Ok(dec!(0)),
        );
        form.quantity.set("3");
        assert_eq!(
            form.validate().map_err(|e| e.to_string()),
            Err("You can only sell up to 2 ETH/USD".to_string())
        );
    }

    #[test]
    fn sell_without_holdings_needs_selection() {
        let mut form = SellForm::new();
        form.quantity.set("1");
        assert_eq!(form.validate(), Err(TradeRejection::NoSelection));
    }

    #[test]
    fn acknowledge_returns_to_idle() {
        let mut state = TradeState::Failed("x".to_string());
        assert_eq!(state.message(), Some("x"));
        state.acknowledge();
        assert_eq!(state, TradeState::Idle);

        let mut busy = TradeState::Submitting;
        busy.acknowledge();
        assert_eq!(busy, TradeState::Submitting);
    }
}
