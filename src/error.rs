//! Crate-level error types.
//!
//! [`CoinsimError`] unifies every error source (configuration, HTTP,
//! WebSocket, STOMP framing, JSON, local validation) behind a single enum so
//! callers can match on the variant they care about while still using the
//! `?` operator for easy propagation.

use crate::views::trade::TradeRejection;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CoinsimError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum CoinsimError {
    /// Configuration could not be loaded or a value failed to parse.
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP request could not be sent or its body could not be read.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    ///
    /// `message` is the backend-provided `error` field when present,
    /// otherwise a generic `Error: <status>` string.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A WebSocket operation (connect, send, receive) failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// The peer sent a STOMP `ERROR` frame or violated the protocol.
    #[error("stomp error: {0}")]
    Stomp(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A response or frame did not have the expected shape.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// Input was rejected locally before any request was sent.
    #[error("{0}")]
    Validation(#[from] TradeRejection),

    /// Terminal setup or teardown failed.
    #[error("io error: {0}")]
    Io(String),
}

impl CoinsimError {
    /// Returns the message to show the user for a failed action.
    ///
    /// Status errors carry the backend's own message; everything else falls
    /// back to the error's display form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Http(e) if e.is_timeout() => "request timed out".to_string(),
            Self::Http(e) if e.is_connect() => "backend unreachable".to_string(),
            other => other.to_string(),
        }
    }
}
