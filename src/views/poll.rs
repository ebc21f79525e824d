//! Periodic refresh timers for mounted views.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// A running poll timer. Dropping the handle stops the timer.
#[derive(Debug)]
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Returns `true` once the timer has stopped on its own.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Calls `on_tick` every `period`, first after one full period.
///
/// The timer stops when `on_tick` returns `false` (typically because the
/// receiving channel has closed) or when the handle is dropped.
pub fn spawn_poller<F>(period: Duration, mut on_tick: F) -> PollHandle
where
    F: FnMut() -> bool + Send + 'static,
{
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if !on_tick() {
                debug!("Poll receiver gone, stopping timer");
                break;
            }
        }
    });

    PollHandle { task }
}
