//! Shared price stream handle.
//!
//! One [`PriceFeed`] owns at most one live connection. Every
//! [`connect`](PriceFeed::connect) call registers a listener and starts the
//! connection if none is running; when the last [`PriceSubscription`] is
//! dropped the connection is torn down.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{ConnectionManager, FeedEvent};
use crate::config::StreamConfig;

/// Capacity of the event fan-out. A slow listener that falls further behind
/// skips ahead; the next snapshot brings it back in sync.
const EVENT_CAPACITY: usize = 256;

/// A running connection task.
struct Running {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Running {
    fn stop(self) {
        if self.shutdown.send(true).is_err() {
            // Receiver already gone: the task has exited on its own.
            self.task.abort();
        }
    }
}

struct FeedInner {
    config: StreamConfig,
    events: broadcast::Sender<FeedEvent>,
    running: Mutex<Option<Running>>,
    listeners: AtomicUsize,
}

impl FeedInner {
    fn running(&self) -> MutexGuard<'_, Option<Running>> {
        self.running
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn teardown(&self) {
        stop_running(&mut self.running());
    }
}

fn stop_running(running: &mut Option<Running>) {
    if let Some(running) = running.take() {
        info!("Tearing down price stream");
        running.stop();
    }
}

/// Reference-counted handle to the shared price stream connection.
///
/// Cloning the feed shares the same connection.
#[derive(Clone)]
pub struct PriceFeed {
    inner: Arc<FeedInner>,
}

impl PriceFeed {
    pub fn new(config: StreamConfig) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(FeedInner {
                config,
                events,
                running: Mutex::new(None),
                listeners: AtomicUsize::new(0),
            }),
        }
    }

    /// Registers a listener, starting the connection if it is not running.
    ///
    /// Idempotent with respect to the connection: concurrent callers share
    /// one socket. Must be called from within a Tokio runtime.
    pub fn connect(&self) -> PriceSubscription {
        let receiver = self.inner.events.subscribe();

        // The count only changes under the `running` lock, so a racing last
        // drop cannot stop the task this listener is about to share.
        let mut running = self.inner.running();
        let listeners = self.inner.listeners.fetch_add(1, Ordering::SeqCst) + 1;
        let alive = running.as_ref().is_some_and(|r| !r.task.is_finished());
        if !alive {
            let (shutdown, shutdown_rx) = watch::channel(false);
            let manager = ConnectionManager::new(
                self.inner.config.clone(),
                self.inner.events.clone(),
                shutdown_rx,
            );
            let task = tokio::spawn(manager.run());
            *running = Some(Running { shutdown, task });
            info!(listeners, "Started price stream");
        } else {
            debug!(listeners, "Reusing price stream");
        }

        PriceSubscription {
            receiver,
            inner: Arc::clone(&self.inner),
        }
    }

    /// Tears down the connection regardless of listeners.
    ///
    /// Existing subscriptions stay registered and see no further events
    /// until a later [`connect`](Self::connect) starts a fresh connection.
    pub fn disconnect(&self) {
        self.inner.teardown();
    }

    /// Returns `true` while a connection task is running.
    pub fn is_running(&self) -> bool {
        self.inner
            .running()
            .as_ref()
            .is_some_and(|r| !r.task.is_finished())
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for PriceFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceFeed")
            .field("url", &self.inner.config.websocket_url)
            .field("listeners", &self.listener_count())
            .field("running", &self.is_running())
            .finish()
    }
}

/// A registered listener on the [`PriceFeed`].
///
/// Dropping it unregisters the listener; the last drop closes the
/// connection.
pub struct PriceSubscription {
    receiver: broadcast::Receiver<FeedEvent>,
    inner: Arc<FeedInner>,
}

impl PriceSubscription {
    /// Waits for the next event.
    ///
    /// Returns `None` only if the feed itself has been dropped.
    pub async fn recv(&mut self) -> Option<FeedEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Price listener lagged, skipping events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for PriceSubscription {
    fn drop(&mut self) {
        let mut running = self.inner.running();
        if self.inner.listeners.fetch_sub(1, Ordering::SeqCst) == 1 {
            debug!("Last price listener dropped");
            stop_running(&mut running);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::websocket::StreamStatus;

    fn unreachable_feed() -> PriceFeed {
        PriceFeed::new(StreamConfig {
            websocket_url: "ws://127.0.0.1:1/ws".to_string(),
            reconnect_delay: Duration::from_millis(50),
            heartbeat: Duration::from_millis(4000),
        })
    }

    #[tokio::test]
    async fn connect_is_shared_and_refcounted() {
        let feed = unreachable_feed();
        assert!(!feed.is_running());

        let first = feed.connect();
        let second = feed.connect();
        assert!(feed.is_running());
        assert_eq!(feed.listener_count(), 2);

        drop(first);
        assert!(feed.is_running());
        assert_eq!(feed.listener_count(), 1);

        drop(second);
        assert!(!feed.is_running());
        assert_eq!(feed.listener_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn connect_racing_last_drop_keeps_stream() {
        let feed = PriceFeed::new(StreamConfig {
            websocket_url: "ws://127.0.0.1:1/ws".to_string(),
            reconnect_delay: Duration::from_secs(60),
            heartbeat: Duration::ZERO,
        });
        for _ in 0..200 {
            let last = feed.connect();
            let dropper = std::thread::spawn(move || drop(last));
            let next = feed.connect();
            dropper.join().expect("drop thread panicked");

            assert_eq!(feed.listener_count(), 1);
            assert!(feed.is_running(), "live listener left without a stream");
            drop(next);
            assert!(!feed.is_running());
        }
    }

    #[tokio::test]
    async fn disconnect_clears_handle_and_connect_restarts() {
        let feed = unreachable_feed();
        let _sub = feed.connect();
        feed.disconnect();
        assert!(!feed.is_running());

        let _again = feed.connect();
        assert!(feed.is_running());
    }

    #[tokio::test]
    async fn failed_connects_report_status_and_retry() {
        let feed = unreachable_feed();
        let mut sub = feed.connect();

        let mut statuses = Vec::new();
        while statuses.len() < 4 {
            let event = tokio::time::timeout(Duration::from_secs(5), sub.recv())
                .await
                .expect("Timed out waiting for status")
                .expect("Feed closed");
            if let FeedEvent::Status(status) = event {
                statuses.push(status);
            }
        }

        assert_eq!(
            statuses,
            vec![
                StreamStatus::Connecting,
                StreamStatus::Disconnected,
                StreamStatus::Connecting,
                StreamStatus::Disconnected,
            ]
        );
    }
}
