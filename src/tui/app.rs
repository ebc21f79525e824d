//! Application state for the TUI.

use std::time::{Duration, Instant};

use rust_decimal::Decimal;

use crate::views::{
    AccountView, BuyForm, HoldingsView, PriceColumn, PriceTable, SellForm, TransactionColumn,
    TransactionHistory,
};
use crate::websocket::StreamStatus;

/// How long a notice stays in the status line.
const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Central application state container.
pub struct App {
    // -- Page State --
    /// Currently visible page.
    pub page: Page,
    /// Column cursor on sortable tables.
    pub column_cursor: usize,

    // -- Views --
    pub prices: PriceTable,
    pub buy: BuyForm,
    pub sell: SellForm,
    pub holdings: HoldingsView,
    pub history: TransactionHistory,
    pub account: AccountView,

    // -- UI State --
    /// Current input mode.
    pub mode: Mode,
    /// Message shown in the status line (clears after a timeout).
    pub notice: Option<Notice>,

    // -- Connection State --
    /// Price stream connection status.
    pub stream_status: StreamStatus,
    /// Time the last price message arrived.
    pub last_price_update: Option<Instant>,

    // -- Internal --
    /// Flag to signal application should quit.
    pub should_quit: bool,
}

impl App {
    /// Creates a new App instance showing the price table.
    pub fn new() -> Self {
        Self {
            page: Page::Prices,
            column_cursor: 0,

            prices: PriceTable::new(),
            buy: BuyForm::new(),
            sell: SellForm::new(),
            holdings: HoldingsView::new(),
            history: TransactionHistory::new(),
            account: AccountView::new(),

            mode: Mode::Normal,
            notice: None,

            stream_status: StreamStatus::Disconnected,
            last_price_update: None,

            should_quit: false,
        }
    }

    /// Page after the current one, wrapping.
    pub fn next_page(&self) -> Page {
        let index = (self.page.index() + 1) % Page::ALL.len();
        Page::ALL[index]
    }

    /// Page before the current one, wrapping.
    pub fn previous_page(&self) -> Page {
        let index = self
            .page
            .index()
            .checked_sub(1)
            .unwrap_or(Page::ALL.len() - 1);
        Page::ALL[index]
    }

    /// Marks `page` visible.
    pub fn mount(&mut self, page: Page) {
        match page {
            Page::Prices => self.prices.mount(),
            Page::Buy => self.buy.mount(),
            Page::Sell => self.sell.mount(),
            Page::Holdings => self.holdings.mount(),
            Page::History => self.history.mount(),
        }
    }

    /// Marks `page` hidden; its outstanding fetches become no-ops.
    pub fn unmount(&mut self, page: Page) {
        match page {
            Page::Prices => self.prices.unmount(),
            Page::Buy => self.buy.unmount(),
            Page::Sell => self.sell.unmount(),
            Page::Holdings => self.holdings.unmount(),
            Page::History => self.history.unmount(),
        }
    }

    /// Number of sortable columns on the current page.
    pub fn column_count(&self) -> usize {
        match self.page {
            Page::Prices => PriceColumn::ALL.len(),
            Page::History => TransactionColumn::ALL.len(),
            _ => 0,
        }
    }

    pub fn move_column_cursor(&mut self, offset: isize) {
        let count = self.column_count() as isize;
        if count > 0 {
            self.column_cursor = (self.column_cursor as isize + offset).rem_euclid(count) as usize;
        }
    }

    /// Sorts the current table by the column under the cursor.
    pub fn sort_by_cursor(&mut self) {
        match self.page {
            Page::Prices => {
                if let Some(&column) = PriceColumn::ALL.get(self.column_cursor) {
                    self.prices.request_sort(column);
                }
            }
            Page::History => {
                if let Some(&column) = TransactionColumn::ALL.get(self.column_cursor) {
                    self.history.request_sort(column);
                }
            }
            _ => {}
        }
    }

    /// Cash balance as last reported to any view.
    pub fn cash_balance(&self) -> Option<Decimal> {
        match self.page {
            Page::Buy => self.buy.balance(),
            Page::Sell => self.sell.balance(),
            _ => None,
        }
        .or(self.holdings.balance())
        .or(self.buy.balance())
        .or(self.sell.balance())
    }

    /// Shows an informational notice.
    pub fn show_info(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::new(message, NoticeKind::Info));
    }

    /// Shows an error notice.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.notice = Some(Notice::new(message, NoticeKind::Error));
    }

    /// Clears notices older than the timeout and returns trade forms to idle.
    pub fn clear_stale_notices(&mut self) {
        if let Some(ref notice) = self.notice
            && notice.timestamp.elapsed() > NOTICE_TTL
        {
            self.notice = None;
            self.buy.state_mut().acknowledge();
            self.sell.state_mut().acknowledge();
            self.account.dismiss();
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Pages of the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Page {
    Prices,
    Buy,
    Sell,
    Holdings,
    History,
}

impl Page {
    /// Pages in tab order.
    pub const ALL: [Page; 5] = [
        Page::Prices,
        Page::Buy,
        Page::Sell,
        Page::Holdings,
        Page::History,
    ];

    /// Returns the display title for the page.
    pub fn title(self) -> &'static str {
        match self {
            Page::Prices => "Prices",
            Page::Buy => "Buy",
            Page::Sell => "Sell",
            Page::Holdings => "Holdings",
            Page::History => "History",
        }
    }

    pub fn index(self) -> usize {
        Page::ALL.iter().position(|p| *p == self).unwrap_or(0)
    }

    /// Whether the page listens to the price stream while mounted.
    pub fn uses_stream(self) -> bool {
        matches!(self, Page::Prices | Page::Buy | Page::History)
    }

    /// Whether the page re-fetches on the poll interval while mounted.
    pub fn polls(self) -> bool {
        matches!(self, Page::Holdings | Page::History)
    }
}

/// Input mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    /// Editing the quantity field of a trade form.
    Insert,
    /// Waiting for confirmation of an account reset.
    Confirm,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A message shown in the status line.
#[derive(Clone, Debug)]
pub struct Notice {
    pub message: String,
    pub kind: NoticeKind,
    pub timestamp: Instant,
}

impl Notice {
    fn new(message: impl Into<String>, kind: NoticeKind) -> Self {
        Self {
            message: message.into(),
            kind,
            timestamp: Instant::now(),
        }
    }
}
