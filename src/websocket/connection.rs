//! Price stream session lifecycle.
//!
//! [`ConnectionManager`] connects, performs the STOMP handshake, subscribes
//! to the prices topic, requests a snapshot and then reads until the session
//! ends. Every reconnect waits the same fixed delay.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, watch};
use tokio::time::{Instant, Interval, sleep, sleep_until};
use tracing::{error, info, warn};
use tungstenite::Message as WsMessage;

use super::handler::{Inbound, process_text};
use super::stomp::{HEARTBEAT, Heartbeat};
use super::subscription::{
    host_of, request_snapshot, stomp_connect, stomp_disconnect, subscribe_prices,
};
use super::{FeedEvent, StreamStatus, WsReader, WsWriter, connect};
use crate::Result;
use crate::config::StreamConfig;

/// Why the reader loop exited.
#[derive(Debug, PartialEq, Eq)]
enum DisconnectReason {
    /// The connection was lost or errored.
    ConnectionError,
    /// Nothing arrived within twice the negotiated incoming heart-beat.
    HeartbeatTimeout,
    /// The server sent a STOMP `ERROR` frame.
    ServerError,
    /// The owning feed asked the session to stop.
    Shutdown,
}

/// Runs one price stream connection, reconnecting until shut down.
pub struct ConnectionManager {
    config: StreamConfig,
    events: broadcast::Sender<FeedEvent>,
    shutdown: watch::Receiver<bool>,
}

impl ConnectionManager {
    /// Creates a new connection manager.
    ///
    /// Events go to `events`; sending `true` on the `shutdown` channel (or
    /// dropping its sender) ends [`run`](Self::run).
    #[must_use]
    pub fn new(
        config: StreamConfig,
        events: broadcast::Sender<FeedEvent>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config,
            events,
            shutdown,
        }
    }

    fn emit(&self, event: FeedEvent) {
        // No listeners is fine; the feed tears us down when the last one leaves.
        let _ = self.events.send(event);
    }

    fn is_shutdown(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Waits until shutdown is requested or the feed is gone.
    async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
        let _ = shutdown.wait_for(|stop| *stop).await;
    }

    /// Runs the connection loop until shutdown.
    ///
    /// Connection failures, heart-beat timeouts and server `ERROR` frames
    /// all lead to a reconnect after `reconnect_delay`.
    pub async fn run(self) {
        loop {
            if self.is_shutdown() {
                info!("Price stream shutting down");
                return;
            }

            self.emit(FeedEvent::Status(StreamStatus::Connecting));
            info!(url = %self.config.websocket_url, "Connecting to price stream");

            let reason = match self.session().await {
                Ok(reason) => reason,
                Err(e) => {
                    error!("Price stream connection failed: {e}");
                    DisconnectReason::ConnectionError
                }
            };

            if reason == DisconnectReason::Shutdown {
                info!("Price stream shutting down");
                self.emit(FeedEvent::Status(StreamStatus::Disconnected));
                return;
            }

            self.emit(FeedEvent::Status(StreamStatus::Disconnected));
            info!(
                ?reason,
                delay_secs = self.config.reconnect_delay.as_secs_f64(),
                "Price stream lost, reconnecting after delay"
            );

            let mut shutdown = self.shutdown.clone();
            tokio::select! {
                () = sleep(self.config.reconnect_delay) => {}
                () = Self::shutdown_requested(&mut shutdown) => {
                    info!("Price stream shutting down");
                    return;
                }
            }
        }
    }

    /// Connects and runs one session to completion.
    async fn session(&self) -> Result<DisconnectReason> {
        let mut shutdown = self.shutdown.clone();
        let url = self.config.websocket_url.clone();

        let setup = async {
            let (mut write, mut read) = connect(&url).await?;
            let heartbeat =
                stomp_connect(&mut write, &mut read, host_of(&url), self.config.heartbeat).await?;
            subscribe_prices(&mut write).await?;
            request_snapshot(&mut write).await?;
            Ok::<_, crate::CoinsimError>((write, read, heartbeat))
        };

        let (write, read, heartbeat) = tokio::select! {
            result = setup => result?,
            () = Self::shutdown_requested(&mut shutdown) => return Ok(DisconnectReason::Shutdown),
        };

        self.emit(FeedEvent::Status(StreamStatus::Connected));
        info!("Price stream connected and subscribed");

        Ok(self.read_loop(write, read, heartbeat).await)
    }

    /// Reads frames until disconnection, heart-beat timeout, server error
    /// or shutdown. Sends heart-beats at the negotiated outgoing period.
    async fn read_loop(
        &self,
        mut write: WsWriter,
        mut read: WsReader,
        heartbeat: Heartbeat,
    ) -> DisconnectReason {
        let mut shutdown = self.shutdown.clone();

        let mut outgoing = heartbeat.outgoing.map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            interval
        });
        let silence_limit = heartbeat.incoming.map(|period| period * 2);
        let mut last_received = Instant::now();

        loop {
            let deadline = silence_limit.map(|limit| last_received + limit);

            tokio::select! {
                msg = read.next() => {
                    last_received = Instant::now();
                    match msg {
                        Some(Ok(WsMessage::Text(text))) => {
                            for inbound in process_text(&text) {
                                match inbound {
                                    Inbound::Prices(prices) => {
                                        self.emit(FeedEvent::Prices(Arc::new(prices)));
                                    }
                                    Inbound::ServerError(_) => {
                                        return DisconnectReason::ServerError;
                                    }
                                }
                            }
                        }
                        Some(Ok(WsMessage::Close(frame))) => {
                            warn!(?frame, "Price stream closed by server");
                            return DisconnectReason::ConnectionError;
                        }
                        Some(Ok(_)) => {} // Binary/Ping/Pong frames
                        Some(Err(e)) => {
                            warn!("Price stream error: {e}");
                            return DisconnectReason::ConnectionError;
                        }
                        None => {
                            warn!("Price stream ended");
                            return DisconnectReason::ConnectionError;
                        }
                    }
                }

                () = next_tick(outgoing.as_mut()) => {
                    if let Err(e) = write.send(WsMessage::Text(HEARTBEAT.into())).await {
                        warn!("Failed to send heart-beat: {e}");
                        return DisconnectReason::ConnectionError;
                    }
                }

                () = sleep_until_opt(deadline) => {
                    warn!("No data from price stream within heart-beat window");
                    return DisconnectReason::HeartbeatTimeout;
                }

                () = Self::shutdown_requested(&mut shutdown) => {
                    stomp_disconnect(&mut write).await;
                    return DisconnectReason::Shutdown;
                }
            }
        }
    }
}

/// Ticks `interval`, or never completes when there is none.
async fn next_tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Sleeps until `deadline`, or forever when there is none.
async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
