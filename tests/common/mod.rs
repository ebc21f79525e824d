//! Shared test utilities: an in-memory trading backend.

#![allow(dead_code)]

use std::sync::Mutex;

use tokio::sync::Notify;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use coinsim::api::{TradingApi, status_error};
use coinsim::models::{
    Holding, PriceQuote, ResetConfirmation, TradeRequest, Transaction, TransactionType,
};
use coinsim::{CoinsimError, Result};

/// Starting cash balance of a fresh account.
pub const STARTING_BALANCE: Decimal = dec!(10000);

/// Backend state kept by [`FakeApi`].
#[derive(Debug, Clone)]
pub struct FakeState {
    pub balance: Decimal,
    pub prices: Vec<PriceQuote>,
    pub holdings: Vec<Holding>,
    pub transactions: Vec<Transaction>,
    /// When set, buy and sell answer `400` with this error message.
    pub reject_trades: Option<String>,
    /// When set, every call answers with this status.
    pub outage: Option<u16>,
    /// When set, buy and sell wait for [`FakeApi::release_trade`].
    pub hold_trades: bool,
}

/// An in-memory backend that executes trades at the listed price.
#[derive(Debug)]
pub struct FakeApi {
    state: Mutex<FakeState>,
    calls: Mutex<Vec<&'static str>>,
    release: Notify,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                balance: STARTING_BALANCE,
                prices: vec![
                    quote("XBT/USD", "Bitcoin", dec!(50000)),
                    quote("ETH/USD", "Ethereum", dec!(3000)),
                    quote("SOL/USD", "Solana", dec!(150)),
                ],
                holdings: Vec::new(),
                transactions: Vec::new(),
                reject_trades: None,
                outage: None,
                hold_trades: false,
            }),
            calls: Mutex::new(Vec::new()),
            release: Notify::new(),
        }
    }

    /// Applies `f` to the backend state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        let mut state = self.state.lock().expect("state lock poisoned");
        f(&mut state)
    }

    /// Endpoints called so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("calls lock poisoned").clone()
    }

    pub fn balance_now(&self) -> Decimal {
        self.with_state(|s| s.balance)
    }

    /// Lets one held buy or sell through.
    pub fn release_trade(&self) {
        self.release.notify_one();
    }

    async fn wait_if_held(&self) {
        if self.with_state(|s| s.hold_trades) {
            self.release.notified().await;
        }
    }

    fn enter(&self, endpoint: &'static str) -> Result<()> {
        self.calls.lock().expect("calls lock poisoned").push(endpoint);
        match self.with_state(|s| s.outage) {
            Some(status) => Err(status_error(status, "")),
            None => Ok(()),
        }
    }

    fn trade(&self, kind: TransactionType, request: &TradeRequest) -> Result<Transaction> {
        self.with_state(|state| {
            if let Some(ref message) = state.reject_trades {
                return Err(rejected(message));
            }
            let price = state
                .prices
                .iter()
                .find(|q| q.symbol == request.symbol)
                .and_then(|q| q.price)
                .ok_or_else(|| rejected("Cryptocurrency not found"))?;
            let total = price * request.quantity;

            let position = state.holdings.iter().position(|h| h.symbol == request.symbol);
            match kind {
                TransactionType::Buy => {
                    if total > state.balance {
                        return Err(rejected("Insufficient balance"));
                    }
                    state.balance -= total;
                    match position {
                        Some(i) => state.holdings[i].balance += request.quantity,
                        None => state.holdings.push(holding(&request.symbol, request.quantity)),
                    }
                }
                TransactionType::Sell => {
                    let Some(i) = position.filter(|i| state.holdings[*i].balance >= request.quantity)
                    else {
                        return Err(rejected("Insufficient cryptocurrency balance"));
                    };
                    state.holdings[i].balance -= request.quantity;
                    state.balance += total;
                }
            }
            for h in state.holdings.iter_mut().filter(|h| h.symbol == request.symbol) {
                h.current_price = Some(price);
                h.current_value = Some(price * h.balance);
            }

            let transaction = Transaction {
                id: state.transactions.len() as u64 + 1,
                crypto_symbol: request.symbol.clone(),
                transaction_type: kind,
                amount: request.quantity,
                price,
                total_value: total,
                transaction_date: None,
            };
            state.transactions.push(transaction.clone());
            Ok(transaction)
        })
    }
}

impl Default for FakeApi {
    fn default() -> Self {
        Self::new()
    }
}

impl TradingApi for FakeApi {
    async fn all_prices(&self) -> Result<Vec<PriceQuote>> {
        self.enter("prices")?;
        Ok(self.with_state(|s| s.prices.clone()))
    }

    async fn balance(&self) -> Result<Decimal> {
        self.enter("balance")?;
        Ok(self.balance_now())
    }

    async fn holdings(&self) -> Result<Vec<Holding>> {
        self.enter("holdings")?;
        Ok(self.with_state(|s| s.holdings.clone()))
    }

    async fn transactions(&self) -> Result<Vec<Transaction>> {
        self.enter("transactions")?;
        Ok(self.with_state(|s| s.transactions.clone()))
    }

    async fn buy(&self, request: &TradeRequest) -> Result<Transaction> {
        self.enter("buy")?;
        self.wait_if_held().await;
        self.trade(TransactionType::Buy, request)
    }

    async fn sell(&self, request: &TradeRequest) -> Result<Transaction> {
        self.enter("sell")?;
        self.wait_if_held().await;
        self.trade(TransactionType::Sell, request)
    }

    async fn reset(&self) -> Result<ResetConfirmation> {
        self.enter("reset")?;
        self.with_state(|s| {
            s.balance = STARTING_BALANCE;
            s.holdings.clear();
            s.transactions.clear();
        });
        Ok(ResetConfirmation {
            message: Some("Account reset successfully".to_string()),
            balance: Some(STARTING_BALANCE),
        })
    }
}

pub fn quote(symbol: &str, name: &str, price: Decimal) -> PriceQuote {
    PriceQuote {
        name: Some(name.to_string()),
        ..PriceQuote::new(symbol, price)
    }
}

pub fn holding(symbol: &str, balance: Decimal) -> Holding {
    Holding {
        id: None,
        symbol: symbol.to_string(),
        name: None,
        balance,
        current_price: None,
        current_value: None,
        last_updated: None,
    }
}

fn rejected(message: &str) -> CoinsimError {
    status_error(400, &serde_json::json!({ "error": message }).to_string())
}
