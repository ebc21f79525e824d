//! Terminal user interface.
//!
//! A Ratatui front end with one page per view: live prices, buy, sell,
//! holdings and transaction history. State changes flow through
//! [`event::update`]; network work is carried out by [`runtime::Runtime`].

pub mod app;
pub mod components;
pub mod event;
pub mod runtime;
pub mod tabs;
pub mod terminal;
pub mod ui;

pub use app::{App, Page};
pub use event::{Action, Event, Message, update};
pub use runtime::Runtime;
pub use terminal::{Tui, restore_terminal, setup_terminal};
pub use ui::render;
