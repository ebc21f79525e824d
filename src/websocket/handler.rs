//! Incoming message processing for the price stream.
//!
//! Undecodable frames and payloads are logged and dropped; they never end
//! the session. Only a STOMP `ERROR` frame asks the caller to reconnect.

use tracing::{debug, warn};

use super::stomp::{self, Command, Frame};
use super::subscription::PRICES_TOPIC;
use crate::models::PriceMessage;

/// What one WebSocket text message meant to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// A price snapshot or delta on the prices topic.
    Prices(PriceMessage),
    /// The server reported a protocol error and will close the session.
    ServerError(String),
}

/// Decodes a WebSocket text message into zero or more inbound events.
///
/// Heart-beats and frames for other destinations yield nothing.
pub fn process_text(text: &str) -> Vec<Inbound> {
    let frames = match stomp::decode(text) {
        Ok(frames) => frames,
        Err(e) => {
            warn!("Dropping undecodable STOMP frame: {e}");
            return Vec::new();
        }
    };

    frames.iter().filter_map(process_frame).collect()
}

fn process_frame(frame: &Frame) -> Option<Inbound> {
    match frame.command {
        Command::Message => {
            let destination = frame.header("destination");
            if destination.is_some_and(|d| d != PRICES_TOPIC) {
                debug!(?destination, "Ignoring message for other destination");
                return None;
            }
            parse_prices(&frame.body).map(Inbound::Prices)
        }
        Command::Error => {
            let message = frame
                .header("message")
                .map(String::from)
                .unwrap_or_else(|| frame.body.clone());
            warn!(%message, "STOMP ERROR frame received");
            Some(Inbound::ServerError(message))
        }
        other => {
            debug!(command = %other, "Ignoring frame");
            None
        }
    }
}

/// Parses a prices-topic body; JSON arrays are snapshots, objects deltas.
pub fn parse_prices(body: &str) -> Option<PriceMessage> {
    match serde_json::from_str::<PriceMessage>(body) {
        Ok(message) => Some(message),
        Err(e) => {
            warn!("Dropping malformed price payload: {e}");
            None
        }
    }
}
