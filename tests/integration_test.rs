//! Checks against a running backend.
//!
//! These tests talk to the backend named by `COINSIM_API_URL` and
//! `COINSIM_WS_URL` (defaults: `localhost:8080`). They only read state.
//! Run with: `cargo test --features integration-tests`

#![cfg(feature = "integration-tests")]

use std::time::Duration;

use coinsim::api::RestClient;
use coinsim::config::fetch_config;
use coinsim::websocket::{FeedEvent, PriceFeed, StreamStatus};

fn client() -> RestClient {
    let config = fetch_config().expect("Failed to load config");
    RestClient::new(&config.backend).expect("Failed to build client")
}

#[tokio::test]
async fn test_prices_are_listed() {
    let prices = client().all_prices().await.expect("Failed to fetch prices");
    assert!(!prices.is_empty(), "backend lists no pairs");
    assert!(prices.iter().all(|q| !q.symbol.is_empty()));
}

#[tokio::test]
async fn test_pairs_match_names() {
    let client = client();
    let pairs = client.pairs().await.expect("Failed to fetch pairs");
    let names = client
        .pairs_with_names()
        .await
        .expect("Failed to fetch pair names");
    for pair in &pairs {
        assert!(names.contains_key(pair), "{pair} has no display name");
    }
}

#[tokio::test]
async fn test_account_endpoints_respond() {
    let client = client();
    let balance = client.balance().await.expect("Failed to fetch balance");
    assert!(!balance.is_sign_negative());
    client.holdings().await.expect("Failed to fetch holdings");
    client
        .transactions()
        .await
        .expect("Failed to fetch transactions");
}

#[tokio::test]
async fn test_stream_connects_and_delivers_prices() {
    let config = fetch_config().expect("Failed to load config");
    let feed = PriceFeed::new(config.stream);
    let mut subscription = feed.connect();

    let mut connected = false;
    let received = tokio::time::timeout(Duration::from_secs(30), async {
        while let Some(event) = subscription.recv().await {
            match event {
                FeedEvent::Status(StreamStatus::Connected) => connected = true,
                FeedEvent::Prices(_) => return true,
                FeedEvent::Status(_) => {}
            }
        }
        false
    })
    .await
    .unwrap_or(false);

    assert!(connected, "stream never connected");
    assert!(received, "no price message within 30s");
    feed.disconnect();
}
