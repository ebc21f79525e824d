//! `reqwest`-based client for the backend's `/api` endpoints.

use std::collections::{BTreeMap, HashMap};

use reqwest::{Client, Response};
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::TradingApi;
use crate::config::BackendConfig;
use crate::error::CoinsimError;
use crate::models::{
    BalanceResponse, Holding, PriceQuote, ResetConfirmation, TradeRequest, Transaction,
};
use crate::Result;

/// HTTP client bound to one backend base URL (e.g. `http://localhost:8080/api`).
#[derive(Clone, Debug)]
pub struct RestClient {
    base_url: String,
    client: Client,
}

impl RestClient {
    /// Builds a client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CoinsimError::Http`] if the underlying client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Returns the base URL requests are resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // -- Prices --

    /// `GET /crypto/prices`: full quotes including names.
    pub async fn all_prices(&self) -> Result<Vec<PriceQuote>> {
        self.get("/crypto/prices").await
    }

    /// `GET /prices`
    pub async fn prices(&self) -> Result<Vec<PriceQuote>> {
        self.get("/prices").await
    }

    /// `GET /prices/latest`: symbol to last price.
    pub async fn latest_prices(&self) -> Result<HashMap<String, Decimal>> {
        self.get("/prices/latest").await
    }

    /// `GET /prices/{symbol}`
    pub async fn price(&self, symbol: &str) -> Result<PriceQuote> {
        self.get(&format!("/prices/{}", urlencoding::encode(symbol)))
            .await
    }

    // -- Pairs --

    /// `GET /pairs`: tradable symbols.
    pub async fn pairs(&self) -> Result<Vec<String>> {
        self.get("/pairs").await
    }

    /// `GET /pairs/with-names`: symbol to display name.
    pub async fn pairs_with_names(&self) -> Result<BTreeMap<String, String>> {
        self.get("/pairs/with-names").await
    }

    // -- Account --

    /// `GET /transactions/balance`
    ///
    /// # Errors
    ///
    /// Besides transport and status errors, a body carrying an `error`
    /// field or no `balance` is reported as
    /// [`CoinsimError::MalformedMessage`].
    pub async fn balance(&self) -> Result<Decimal> {
        let response: BalanceResponse = self.get("/transactions/balance").await?;
        match response {
            BalanceResponse {
                balance: Some(balance),
                ..
            } => Ok(balance),
            BalanceResponse {
                error: Some(error), ..
            } => Err(CoinsimError::MalformedMessage(error)),
            _ => Err(CoinsimError::MalformedMessage(
                "balance response has no balance".to_string(),
            )),
        }
    }

    /// `GET /transactions/holdings`
    pub async fn holdings(&self) -> Result<Vec<Holding>> {
        self.get("/transactions/holdings").await
    }

    /// `GET /transactions`
    pub async fn transactions(&self) -> Result<Vec<Transaction>> {
        self.get("/transactions").await
    }

    /// `POST /transactions/buy`
    pub async fn buy(&self, request: &TradeRequest) -> Result<Transaction> {
        info!(symbol = %request.symbol, quantity = %request.quantity, "Submitting buy");
        self.post("/transactions/buy", request).await
    }

    /// `POST /transactions/sell`
    pub async fn sell(&self, request: &TradeRequest) -> Result<Transaction> {
        info!(symbol = %request.symbol, quantity = %request.quantity, "Submitting sell");
        self.post("/transactions/sell", request).await
    }

    /// `POST /transactions/reset`: restores the starting cash balance.
    pub async fn reset(&self) -> Result<ResetConfirmation> {
        info!("Submitting account reset");
        self.post("/transactions/reset", &serde_json::json!({})).await
    }

    // -- Internal --

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.client.get(&url).send().await?;
        decode(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self.client.post(&url).json(body).send().await?;
        decode(response).await
    }
}

/// Reads a response body as JSON, turning non-2xx statuses into errors.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let err = status_error(status.as_u16(), &body);
        warn!(status = status.as_u16(), error = %err, "Request failed");
        return Err(err);
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Builds the error for a non-success response.
///
/// Uses the body's `error` field, then its `message` field, and finally
/// `Error: <status>` when the body carries neither.
pub fn status_error(status: u16, body: &str) -> CoinsimError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["error", "message"]
                .iter()
                .find_map(|field| {
                    value
                        .get(field)
                        .and_then(|v| v.as_str())
                        .filter(|m| !m.is_empty())
                })
                .map(String::from)
        })
        .unwrap_or_else(|| format!("Error: {status}"));

    CoinsimError::Status { status, message }
}

impl TradingApi for RestClient {
    async fn all_prices(&self) -> Result<Vec<PriceQuote>> {
        RestClient::all_prices(self).await
    }

    async fn balance(&self) -> Result<Decimal> {
        RestClient::balance(self).await
    }

    async fn holdings(&self) -> Result<Vec<Holding>> {
        RestClient::holdings(self).await
    }

    async fn transactions(&self) -> Result<Vec<Transaction>> {
        RestClient::transactions(self).await
    }

    async fn buy(&self, request: &TradeRequest) -> Result<Transaction> {
        RestClient::buy(self, request).await
    }

    async fn sell(&self, request: &TradeRequest) -> Result<Transaction> {
        RestClient::sell(self, request).await
    }

    async fn reset(&self) -> Result<ResetConfirmation> {
        RestClient::reset(self).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn status_message(status: u16, body: &str) -> String {
        match status_error(status, body) {
            CoinsimError::Status { message, .. } => message,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn status_error_prefers_error_field() {
        let body = r#"{"error":"Insufficient balance to complete this purchase","message":"x"}"#;
        assert_eq!(
            status_message(400, body),
            "Insufficient balance to complete this purchase"
        );
    }

    #[test]
    fn status_error_falls_back_to_message_field() {
        assert_eq!(
            status_message(500, r#"{"message":"Internal Server Error"}"#),
            "Internal Server Error"
        );
    }

    #[test]
    fn status_error_generic_fallback() {
        assert_eq!(status_message(502, "<html>bad gateway</html>"), "Error: 502");
        assert_eq!(status_message(404, ""), "Error: 404");
        assert_eq!(status_message(400, r#"{"error":""}"#), "Error: 400");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = RestClient::new(&BackendConfig {
            api_url: "http://localhost:8080/api/".to_string(),
            request_timeout: Duration::from_secs(1),
        })
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/api");
        assert_eq!(
            client.url("/transactions/buy"),
            "http://localhost:8080/api/transactions/buy"
        );
    }
}
