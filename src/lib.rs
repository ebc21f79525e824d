//! Terminal client for a simulated cryptocurrency trading backend.
//!
//! Streams live prices over STOMP, loads balances, holdings and history over
//! REST, and places simulated buy and sell orders.

pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod sort;
pub mod tui;
pub mod views;
pub mod websocket;

pub use error::{CoinsimError, Result};
