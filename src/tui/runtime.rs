//! Page lifecycle: initial fetch, polling and the stream subscription of the
//! mounted page, plus the network side of user actions.
//!
//! Results come back to the UI loop as [`Message`]s. A page switch mounts
//! the new page before the old one is released, so the price stream stays
//! connected when both pages listen to it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::TradingApi;
use crate::views::{BuyForm, PollHandle, Portfolio, SellForm, spawn_poller};
use crate::websocket::{PriceFeed, PriceSubscription};

use super::app::{App, Page};
use super::event::{Action, Message};

/// Background work owned by the mounted page. Dropping it stops the work.
struct MountedPage {
    page: Page,
    _poll: Option<PollHandle>,
    _stream: Option<StreamForwarder>,
}

/// Forwards feed events to the UI loop while alive.
struct StreamForwarder {
    task: JoinHandle<()>,
}

impl StreamForwarder {
    fn spawn(mut subscription: PriceSubscription, tx: mpsc::UnboundedSender<Message>) -> Self {
        let task = tokio::spawn(async move {
            while let Some(event) = subscription.recv().await {
                if tx.send(Message::Feed(event)).is_err() {
                    break;
                }
            }
        });
        Self { task }
    }
}

impl Drop for StreamForwarder {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Drives data loading for whichever page is visible.
pub struct Runtime<A> {
    api: Arc<A>,
    feed: PriceFeed,
    tx: mpsc::UnboundedSender<Message>,
    poll_interval: Duration,
    mounted: Option<MountedPage>,
}

impl<A> Runtime<A>
where
    A: TradingApi + Send + Sync + 'static,
{
    pub fn new(
        api: Arc<A>,
        feed: PriceFeed,
        tx: mpsc::UnboundedSender<Message>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            api,
            feed,
            tx,
            poll_interval,
            mounted: None,
        }
    }

    /// Mounts the page the app currently shows.
    pub fn start(&mut self, app: &mut App) {
        let page = app.page;
        self.mount(app, page);
    }

    /// Page whose background work is running.
    pub fn mounted_page(&self) -> Option<Page> {
        self.mounted.as_ref().map(|m| m.page)
    }

    /// Carries out an action returned by [`update`](super::event::update).
    ///
    /// Network work runs on spawned tasks; outcomes come back as messages,
    /// so this never waits on the backend.
    pub fn execute(&mut self, app: &mut App, action: Action) {
        match action {
            Action::SwitchPage { from, to } => {
                let previous = self.mounted.take();
                self.mount(app, to);
                app.unmount(from);
                drop(previous);
            }
            Action::Refresh(page) => {
                if self.mounted_page() == Some(page) {
                    self.fetch(app, page);
                }
            }
            Action::SubmitBuy => match app.buy.begin_submit() {
                Ok(pending) => {
                    debug!(symbol = %pending.request.symbol, "Submitting purchase");
                    let api = Arc::clone(&self.api);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = BuyForm::place(api.as_ref(), &pending.request).await;
                        let _ = tx.send(Message::BuyFinished(pending, result));
                    });
                }
                Err(rejection) => app.show_error(rejection.to_string()),
            },
            Action::SubmitSell => match app.sell.begin_submit() {
                Ok(pending) => {
                    debug!(symbol = %pending.request.symbol, "Submitting sale");
                    let api = Arc::clone(&self.api);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = SellForm::place(api.as_ref(), &pending.request).await;
                        let _ = tx.send(Message::SellFinished(pending, result));
                    });
                }
                Err(rejection) => app.show_error(rejection.to_string()),
            },
            Action::ResetAccount => {
                if app.account.begin_reset() {
                    debug!("Resetting account");
                    let api = Arc::clone(&self.api);
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let result = api.reset().await;
                        let _ = tx.send(Message::ResetFinished(result));
                    });
                }
            }
        }
    }

    /// Stops all background work and the price stream.
    pub fn shutdown(&mut self) {
        self.mounted = None;
        self.feed.disconnect();
    }

    fn mount(&mut self, app: &mut App, page: Page) {
        app.mount(page);
        self.fetch(app, page);

        let stream = page
            .uses_stream()
            .then(|| StreamForwarder::spawn(self.feed.connect(), self.tx.clone()));
        let poll = page.polls().then(|| {
            let tx = self.tx.clone();
            spawn_poller(self.poll_interval, move || tx.send(Message::Poll(page)).is_ok())
        });

        debug!(
            page = page.title(),
            stream = stream.is_some(),
            poll = poll.is_some(),
            "Mounted page"
        );
        self.mounted = Some(MountedPage {
            page,
            _poll: poll,
            _stream: stream,
        });
    }

    /// Starts the page's load; the result arrives as a message.
    fn fetch(&self, app: &mut App, page: Page) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        debug!(page = page.title(), "Fetching page data");

        match page {
            Page::Prices => {
                let ticket = app.prices.begin_fetch();
                tokio::spawn(async move {
                    let result = api.all_prices().await;
                    let _ = tx.send(Message::PricesLoaded(ticket, result));
                });
            }
            Page::Buy => {
                let ticket = app.buy.begin_load();
                tokio::spawn(async move {
                    let (prices, balance) = tokio::join!(api.all_prices(), api.balance());
                    let _ = tx.send(Message::BuyLoaded {
                        ticket,
                        prices,
                        balance,
                    });
                });
            }
            Page::Sell => {
                let ticket = app.sell.begin_load();
                tokio::spawn(async move {
                    let (holdings, balance) = tokio::join!(api.holdings(), api.balance());
                    let _ = tx.send(Message::SellLoaded {
                        ticket,
                        holdings,
                        balance,
                    });
                });
            }
            Page::Holdings => {
                let ticket = app.holdings.begin_fetch();
                tokio::spawn(async move {
                    let result = Portfolio::fetch(api.as_ref()).await;
                    let _ = tx.send(Message::HoldingsLoaded(ticket, result));
                });
            }
            Page::History => {
                let ticket = app.history.begin_fetch();
                tokio::spawn(async move {
                    let result = api.transactions().await;
                    let _ = tx.send(Message::HistoryLoaded(ticket, result));
                });
            }
        }
    }
}
