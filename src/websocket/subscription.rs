//! STOMP session setup: CONNECT handshake, topic subscription and the
//! snapshot request.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info};
use tungstenite::Message;

use super::stomp::{self, Command, Frame, Heartbeat};
use super::{WsReader, WsWriter};
use crate::Result;
use crate::error::CoinsimError;

/// Topic the backend publishes price updates on.
pub const PRICES_TOPIC: &str = "/topic/prices";

/// Application destination that triggers an immediate full snapshot.
pub const SUBSCRIBE_ALL_DESTINATION: &str = "/app/subscribe-all";

/// Subscription id used for the prices topic.
pub const PRICES_SUBSCRIPTION_ID: &str = "sub-0";

/// How long to wait for `CONNECTED` after sending `CONNECT`.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends one frame as a WebSocket text message.
///
/// # Errors
///
/// Returns a [`CoinsimError::WebSocket`] if sending fails.
pub async fn send_frame(write: &mut WsWriter, frame: &Frame) -> Result<()> {
    write.send(Message::Text(frame.encode().into())).await?;
    debug!(command = %frame.command, "Sent STOMP frame");
    Ok(())
}

/// Performs the STOMP `CONNECT` / `CONNECTED` exchange.
///
/// `host` is the virtual host header; `heartbeat` is offered for both
/// directions. Returns the negotiated heart-beat periods.
///
/// # Errors
///
/// Fails if the server answers with `ERROR`, closes the socket, or does not
/// answer within the handshake timeout.
pub async fn stomp_connect(
    write: &mut WsWriter,
    read: &mut WsReader,
    host: &str,
    heartbeat: Duration,
) -> Result<Heartbeat> {
    let offer = u64::try_from(heartbeat.as_millis()).unwrap_or(u64::MAX);
    let connect = Frame::new(Command::Connect)
        .with_header("accept-version", "1.2")
        .with_header("host", host)
        .with_header("heart-beat", format!("{offer},{offer}"));
    send_frame(write, &connect).await?;

    let connected = tokio::time::timeout(HANDSHAKE_TIMEOUT, await_connected(read))
        .await
        .map_err(|_| CoinsimError::Stomp("timed out waiting for CONNECTED".to_string()))??;

    let negotiated = Heartbeat::negotiate((offer, offer), connected.header("heart-beat"));
    info!(
        version = connected.header("version").unwrap_or("?"),
        outgoing_ms = negotiated.outgoing.map(|d| d.as_millis() as u64),
        incoming_ms = negotiated.incoming.map(|d| d.as_millis() as u64),
        "STOMP session established"
    );
    Ok(negotiated)
}

async fn await_connected(read: &mut WsReader) -> Result<Frame> {
    while let Some(message) = read.next().await {
        let text = match message? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        for frame in stomp::decode(&text)? {
            match frame.command {
                Command::Connected => return Ok(frame),
                Command::Error => {
                    return Err(CoinsimError::Stomp(
                        frame.header("message").unwrap_or(&frame.body).to_string(),
                    ));
                }
                other => debug!(command = %other, "Ignoring frame before CONNECTED"),
            }
        }
    }
    Err(CoinsimError::Stomp(
        "connection closed during handshake".to_string(),
    ))
}

/// Subscribes to the prices topic.
///
/// # Errors
///
/// Returns a [`CoinsimError::WebSocket`] if sending fails.
pub async fn subscribe_prices(write: &mut WsWriter) -> Result<()> {
    let frame = Frame::new(Command::Subscribe)
        .with_header("id", PRICES_SUBSCRIPTION_ID)
        .with_header("destination", PRICES_TOPIC);
    send_frame(write, &frame).await?;
    info!(topic = PRICES_TOPIC, "Subscribed to price updates");
    Ok(())
}

/// Asks the backend to publish a full snapshot right away.
///
/// # Errors
///
/// Returns a [`CoinsimError::WebSocket`] if sending fails.
pub async fn request_snapshot(write: &mut WsWriter) -> Result<()> {
    let frame = Frame::new(Command::Send)
        .with_header("destination", SUBSCRIBE_ALL_DESTINATION)
        .with_header("content-type", "application/json")
        .with_body("{}");
    send_frame(write, &frame).await
}

/// Sends `DISCONNECT` and closes the socket. Errors are ignored.
pub async fn stomp_disconnect(write: &mut WsWriter) {
    let _ = send_frame(write, &Frame::new(Command::Disconnect)).await;
    let _ = write.close().await;
}

/// Extracts the `host` header value from a WebSocket URL.
pub fn host_of(url: &str) -> &str {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    without_scheme
        .split(['/', '?'])
        .next()
        .unwrap_or(without_scheme)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_header_from_url() {
        assert_eq!(host_of("ws://localhost:8080/ws/websocket"), "localhost:8080");
        assert_eq!(host_of("wss://prices.example.com"), "prices.example.com");
        assert_eq!(host_of("ws://h?x=1"), "h");
    }
}
