//! Live price stream over STOMP-on-WebSocket.
//!
//! This module is organized by concern:
//! - [`stomp`] - STOMP 1.2 frame codec and heart-beat negotiation
//! - [`subscription`] - Session handshake and topic subscription
//! - [`handler`] - Incoming message processing
//! - [`connection`] - Reconnecting session loop
//! - [`feed`] - Shared, reference-counted connection handle

mod connection;
mod feed;
mod handler;
pub mod stomp;
mod subscription;

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::info;
use tungstenite::Message;

use crate::Result;
use crate::models::PriceMessage;

pub use connection::ConnectionManager;
pub use feed::{PriceFeed, PriceSubscription};
pub use handler::{Inbound, parse_prices, process_text};
pub use subscription::{
    PRICES_SUBSCRIPTION_ID, PRICES_TOPIC, SUBSCRIBE_ALL_DESTINATION, host_of, request_snapshot,
    send_frame, stomp_connect, stomp_disconnect, subscribe_prices,
};

/// Write half of a price stream connection.
pub type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Read half of a price stream connection.
pub type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Establishes a WebSocket connection to the given URL.
///
/// # Errors
///
/// Returns a [`CoinsimError`](crate::CoinsimError) if the connection or TLS
/// handshake fails.
pub async fn connect(url: &str) -> Result<(WsWriter, WsReader)> {
    let (ws_stream, _) = connect_async(url).await?;
    info!("WebSocket handshake completed");

    Ok(ws_stream.split())
}

/// Connection state of the shared price stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl StreamStatus {
    /// Returns a display label for the status.
    pub fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Live",
        }
    }
}

/// Event delivered to every [`PriceSubscription`].
#[derive(Clone, Debug, PartialEq)]
pub enum FeedEvent {
    /// The connection changed state.
    Status(StreamStatus),
    /// A snapshot or delta arrived on the prices topic.
    Prices(Arc<PriceMessage>),
}
