//! Event handling for the TUI.

use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use rust_decimal::Decimal;
use tokio::sync::mpsc;

use crate::Result;
use crate::models::{Holding, PriceQuote, ResetConfirmation, Transaction};
use crate::views::account::RESET_FAILED;
use crate::views::{
    BuyReceipt, FetchTicket, PendingTrade, Portfolio, QuantityInput, SellReceipt, TradeState,
};
use crate::websocket::FeedEvent;

use super::app::{App, Mode, Page};

/// Events that can occur in the application.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// Terminal was resized.
    Resize(u16, u16),
    /// Periodic tick for UI updates.
    Tick,
}

/// Messages that update application state.
#[derive(Debug)]
pub enum Message {
    /// Input event from terminal.
    Input(Event),

    /// Status change or price update from the stream.
    Feed(FeedEvent),

    /// Price list loaded for the price table.
    PricesLoaded(FetchTicket, Result<Vec<PriceQuote>>),
    /// Tradable quotes and balance loaded for the buy form.
    BuyLoaded {
        ticket: FetchTicket,
        prices: Result<Vec<PriceQuote>>,
        balance: Result<Decimal>,
    },
    /// Holdings and balance loaded for the sell form.
    SellLoaded {
        ticket: FetchTicket,
        holdings: Result<Vec<Holding>>,
        balance: Result<Decimal>,
    },
    /// Holdings page loaded.
    HoldingsLoaded(FetchTicket, Result<Portfolio>),
    /// Transaction history loaded.
    HistoryLoaded(FetchTicket, Result<Vec<Transaction>>),

    /// A submitted purchase came back from the backend.
    BuyFinished(PendingTrade, Result<BuyReceipt>),
    /// A submitted sale came back from the backend.
    SellFinished(PendingTrade, Result<SellReceipt>),
    /// The account reset request finished.
    ResetFinished(Result<ResetConfirmation>),

    /// Poll interval elapsed for a mounted page.
    Poll(Page),

    /// Request to quit the application.
    Quit,
}

/// Spawns a task that polls for terminal events and sends them to a channel.
pub fn spawn_event_reader(tx: mpsc::UnboundedSender<Message>) {
    tokio::spawn(async move {
        loop {
            // Poll for events with a 50ms timeout
            match tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            })
            .await
            {
                Ok(Some(CrosstermEvent::Key(key))) => {
                    if tx.send(Message::Input(Event::Key(key))).is_err() {
                        break;
                    }
                }
                Ok(Some(CrosstermEvent::Resize(w, h))) => {
                    if tx.send(Message::Input(Event::Resize(w, h))).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        }
    });
}

/// Spawns a task that sends periodic tick events.
pub fn spawn_tick_timer(tx: mpsc::UnboundedSender<Message>, interval_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
        loop {
            interval.tick().await;
            if tx.send(Message::Input(Event::Tick)).is_err() {
                break;
            }
        }
    });
}

/// Actions that need the network or task management.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Show another page: mount `to`, then unmount `from`.
    SwitchPage { from: Page, to: Page },
    /// Re-fetch the data of a mounted page.
    Refresh(Page),
    /// Submit the buy form.
    SubmitBuy,
    /// Submit the sell form.
    SubmitSell,
    /// Reset the account to its starting balance.
    ResetAccount,
}

/// Updates application state based on a message.
pub fn update(app: &mut App, message: Message) -> Option<Action> {
    match message {
        Message::Input(event) => handle_input(app, event),
        Message::Feed(FeedEvent::Status(status)) => {
            app.stream_status = status;
            None
        }
        Message::Feed(FeedEvent::Prices(prices)) => {
            app.prices.apply(&prices);
            app.buy.apply_prices(&prices);
            app.history.apply_prices(&prices);
            app.last_price_update = Some(Instant::now());
            None
        }
        Message::PricesLoaded(ticket, result) => {
            app.prices.finish_fetch(ticket, result);
            None
        }
        Message::BuyLoaded {
            ticket,
            prices,
            balance,
        } => {
            app.buy.finish_load(ticket, prices, balance);
            None
        }
        Message::SellLoaded {
            ticket,
            holdings,
            balance,
        } => {
            app.sell.finish_load(ticket, holdings, balance);
            None
        }
        Message::HoldingsLoaded(ticket, result) => {
            app.holdings.finish_fetch(ticket, result);
            None
        }
        Message::HistoryLoaded(ticket, result) => {
            app.history.finish_fetch(ticket, result);
            None
        }
        Message::BuyFinished(pending, result) => {
            let succeeded = app.buy.finish_submit(pending, result).is_ok();
            let message = app.buy.state().message().unwrap_or_default().to_string();
            notify(app, succeeded, message);
            None
        }
        Message::SellFinished(pending, result) => {
            let succeeded = app.sell.finish_submit(pending, result).is_ok();
            let message = app.sell.state().message().unwrap_or_default().to_string();
            notify(app, succeeded, message);
            None
        }
        Message::ResetFinished(result) => match app.account.finish_reset(result) {
            Ok(_) => {
                let status = app.account.status().unwrap_or_default().to_string();
                app.show_info(status);
                // Hidden pages load fresh data when they are mounted.
                Some(Action::Refresh(app.page))
            }
            Err(_) => {
                app.show_error(RESET_FAILED);
                None
            }
        },
        Message::Poll(page) => (page == app.page).then_some(Action::Refresh(page)),
        Message::Quit => {
            app.should_quit = true;
            None
        }
    }
}

fn notify(app: &mut App, succeeded: bool, message: String) {
    if succeeded {
        app.show_info(message);
    } else {
        app.show_error(message);
    }
}

/// Handles terminal input events.
fn handle_input(app: &mut App, event: Event) -> Option<Action> {
    match event {
        Event::Key(key) => handle_key(app, key),
        Event::Resize(_, _) => None,
        Event::Tick => {
            app.clear_stale_notices();
            None
        }
    }
}

/// Handles key press events.
fn handle_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return None;
    }

    // Global keys (work in any mode)
    match key.code {
        KeyCode::Char('q') if app.mode == Mode::Normal => {
            app.should_quit = true;
            return None;
        }
        KeyCode::Esc => {
            app.mode = Mode::Normal;
            return None;
        }
        _ => {}
    }

    // Mode-specific handling
    match app.mode {
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Insert => handle_insert_mode(app, key),
        Mode::Confirm => handle_confirm_mode(app, key),
    }
}

/// Handles keys in normal mode.
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        // Page navigation
        KeyCode::Tab => {
            let to = if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.previous_page()
            } else {
                app.next_page()
            };
            switch_page(app, to)
        }
        KeyCode::BackTab => {
            let to = app.previous_page();
            switch_page(app, to)
        }
        KeyCode::Char(c @ '1'..='5') => {
            let index = (c as usize) - ('1' as usize);
            switch_page(app, Page::ALL[index])
        }

        KeyCode::Char('r') => Some(Action::Refresh(app.page)),
        KeyCode::Char('R') => {
            if !app.account.is_resetting() {
                app.mode = Mode::Confirm;
            }
            None
        }

        _ => match app.page {
            Page::Prices | Page::History => handle_table_keys(app, key),
            Page::Buy => handle_buy_keys(app, key),
            Page::Sell => handle_sell_keys(app, key),
            Page::Holdings => None,
        },
    }
}

fn switch_page(app: &mut App, to: Page) -> Option<Action> {
    if to == app.page {
        return None;
    }
    let from = app.page;
    app.page = to;
    app.column_cursor = 0;
    Some(Action::SwitchPage { from, to })
}

/// Column cursor and sorting on the price and history tables.
fn handle_table_keys(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.move_column_cursor(-1),
        KeyCode::Char('l') | KeyCode::Right => app.move_column_cursor(1),
        KeyCode::Char('s') | KeyCode::Enter => app.sort_by_cursor(),
        _ => {}
    }
    None
}

fn handle_buy_keys(app: &mut App, key: KeyEvent) -> Option<Action> {
    if app.buy.state().is_busy() {
        return None;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.buy.cycle(1),
        KeyCode::Char('k') | KeyCode::Up => app.buy.cycle(-1),
        KeyCode::Char('i') | KeyCode::Enter => app.mode = Mode::Insert,
        _ => {}
    }
    None
}

fn handle_sell_keys(app: &mut App, key: KeyEvent) -> Option<Action> {
    if app.sell.state().is_busy() {
        return None;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.sell.cycle(1),
        KeyCode::Char('k') | KeyCode::Up => app.sell.cycle(-1),
        KeyCode::Char('m') => app.sell.fill_max(),
        KeyCode::Char('i') | KeyCode::Enter => app.mode = Mode::Insert,
        _ => {}
    }
    None
}

/// Handles keys in insert mode (quantity field of the trade forms).
fn handle_insert_mode(app: &mut App, key: KeyEvent) -> Option<Action> {
    let (input, busy) = match app.page {
        Page::Buy => {
            let busy = app.buy.state().is_busy();
            (&mut app.buy.quantity, busy)
        }
        Page::Sell => {
            let busy = app.sell.state().is_busy();
            (&mut app.sell.quantity, busy)
        }
        _ => {
            app.mode = Mode::Normal;
            return None;
        }
    };
    if busy {
        return None;
    }

    match key.code {
        KeyCode::Enter => {
            app.mode = Mode::Normal;
            match app.page {
                Page::Buy => {
                    *app.buy.state_mut() = TradeState::Validating;
                    Some(Action::SubmitBuy)
                }
                _ => {
                    *app.sell.state_mut() = TradeState::Validating;
                    Some(Action::SubmitSell)
                }
            }
        }
        code => {
            edit_quantity(input, code);
            None
        }
    }
}

/// Applies an editing key to a quantity field.
fn edit_quantity(input: &mut QuantityInput, code: KeyCode) {
    match code {
        KeyCode::Char(c) => {
            input.type_char(c);
        }
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        _ => {}
    }
}

/// Handles keys in confirm mode (account reset).
fn handle_confirm_mode(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Enter => {
            app.mode = Mode::Normal;
            Some(Action::ResetAccount)
        }
        KeyCode::Char('n') => {
            app.mode = Mode::Normal;
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::PriceMessage;
    use crate::websocket::StreamStatus;

    fn key(code: KeyCode) -> Message {
        Message::Input(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    #[test]
    fn number_keys_switch_pages() {
        let mut app = App::new();
        let action = update(&mut app, key(KeyCode::Char('4')));
        assert_eq!(
            action,
            Some(Action::SwitchPage {
                from: Page::Prices,
                to: Page::Holdings
            })
        );
        assert_eq!(app.page, Page::Holdings);
        assert_eq!(update(&mut app, key(KeyCode::Char('4'))), None);
    }

    #[test]
    fn feed_events_reach_every_price_view() {
        let mut app = App::new();
        update(&mut app, Message::Feed(FeedEvent::Status(StreamStatus::Connected)));
        assert_eq!(app.stream_status, StreamStatus::Connected);

        let snapshot = PriceMessage::Snapshot(vec![PriceQuote::new("XBT/USD", dec!(50000))]);
        update(&mut app, Message::Feed(FeedEvent::Prices(Arc::new(snapshot))));
        assert_eq!(app.prices.latest_price("XBT/USD"), Some(dec!(50000)));
        assert_eq!(app.history.latest_price("XBT/USD"), Some(dec!(50000)));
        assert!(app.last_price_update.is_some());
    }

    #[test]
    fn finished_reset_notifies_and_refreshes_visible_page() {
        let mut app = App::new();
        assert!(app.account.begin_reset());
        let confirmation = ResetConfirmation {
            message: None,
            balance: Some(dec!(10000)),
        };
        let action = update(&mut app, Message::ResetFinished(Ok(confirmation)));
        assert_eq!(action, Some(Action::Refresh(Page::Prices)));
        assert!(!app.account.is_resetting());
        assert_eq!(
            app.notice.as_ref().map(|n| n.message.as_str()),
            Some("Account reset successful! Your balance has been restored to $10,000.00.")
        );

        assert!(app.account.begin_reset());
        let failure = crate::CoinsimError::Status {
            status: 500,
            message: "Error: 500".to_string(),
        };
        assert_eq!(update(&mut app, Message::ResetFinished(Err(failure))), None);
        assert_eq!(
            app.notice.as_ref().map(|n| n.message.as_str()),
            Some(RESET_FAILED)
        );
    }

    #[test]
    fn failed_buy_keeps_quantity_and_shows_error() {
        let mut app = App::new();
        app.buy.quantity.set("0.5");
        let pending = app.buy.begin_submit().expect("symbol and quantity are set");
        let failure = crate::CoinsimError::Status {
            status: 400,
            message: "Market closed".to_string(),
        };
        update(&mut app, Message::BuyFinished(pending, Err(failure)));

        assert_eq!(
            app.buy.state().message(),
            Some("Failed to complete purchase: Market closed")
        );
        assert_eq!(app.buy.quantity.as_str(), "0.5");
        let notice = app.notice.as_ref().expect("notice shown");
        assert_eq!(notice.kind, crate::tui::app::NoticeKind::Error);
    }

    #[test]
    fn typing_quantity_and_submitting_buy() {
        let mut app = App::new();
        update(&mut app, key(KeyCode::Char('2')));
        update(&mut app, key(KeyCode::Char('i')));
        assert_eq!(app.mode, Mode::Insert);

        for c in ['0', '.', 'x', '5'] {
            update(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(app.buy.quantity.as_str(), "0.5");

        assert_eq!(update(&mut app, key(KeyCode::Enter)), Some(Action::SubmitBuy));
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.buy.state().is_busy());
    }

    #[test]
    fn q_types_nothing_but_quits_only_in_normal_mode() {
        let mut app = App::new();
        update(&mut app, key(KeyCode::Char('2')));
        update(&mut app, key(KeyCode::Char('i')));
        update(&mut app, key(KeyCode::Char('q')));
        assert!(!app.should_quit);

        update(&mut app, key(KeyCode::Esc));
        update(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn reset_requires_confirmation() {
        let mut app = App::new();
        assert_eq!(update(&mut app, key(KeyCode::Char('R'))), None);
        assert_eq!(app.mode, Mode::Confirm);
        assert_eq!(update(&mut app, key(KeyCode::Char('n'))), None);
        assert_eq!(app.mode, Mode::Normal);

        update(&mut app, key(KeyCode::Char('R')));
        assert_eq!(
            update(&mut app, key(KeyCode::Char('y'))),
            Some(Action::ResetAccount)
        );
    }

    #[test]
    fn poll_only_refreshes_visible_page() {
        let mut app = App::new();
        assert_eq!(update(&mut app, Message::Poll(Page::History)), None);
        app.page = Page::History;
        assert_eq!(
            update(&mut app, Message::Poll(Page::History)),
            Some(Action::Refresh(Page::History))
        );
    }
}
