//! REST access to the trading backend.
//!
//! [`RestClient`] issues one request per call with no retries.
//! [`TradingApi`] is the subset of operations the view models drive, so they
//! can be exercised against an in-memory backend in tests.

mod client;

use std::future::Future;

use rust_decimal::Decimal;

pub use client::{RestClient, status_error};

use crate::Result;
use crate::models::{Holding, PriceQuote, ResetConfirmation, TradeRequest, Transaction};

/// Backend operations used by the view models.
pub trait TradingApi {
    /// `GET /crypto/prices`
    fn all_prices(&self) -> impl Future<Output = Result<Vec<PriceQuote>>> + Send;

    /// `GET /transactions/balance`
    fn balance(&self) -> impl Future<Output = Result<Decimal>> + Send;

    /// `GET /transactions/holdings`
    fn holdings(&self) -> impl Future<Output = Result<Vec<Holding>>> + Send;

    /// `GET /transactions`
    fn transactions(&self) -> impl Future<Output = Result<Vec<Transaction>>> + Send;

    /// `POST /transactions/buy`
    fn buy(&self, request: &TradeRequest) -> impl Future<Output = Result<Transaction>> + Send;

    /// `POST /transactions/sell`
    fn sell(&self, request: &TradeRequest) -> impl Future<Output = Result<Transaction>> + Send;

    /// `POST /transactions/reset`
    fn reset(&self) -> impl Future<Output = Result<ResetConfirmation>> + Send;
}
