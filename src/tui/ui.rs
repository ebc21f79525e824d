//! Main UI rendering coordinator.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
};

use super::app::{App, Mode, Page};
use super::components::{status_bar, tab_bar};
use super::tabs::{history, holdings, prices, trade};

/// Renders the entire application UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Length(1), // Status bar
            Constraint::Min(5),    // Page content
            Constraint::Length(1), // Keybindings help
        ])
        .split(area);

    tab_bar::render(frame, main_layout[0], app);
    status_bar::render(frame, main_layout[1], app);

    let content = main_layout[2];
    match app.page {
        Page::Prices => prices::render(frame, content, app),
        Page::Buy => trade::render_buy(frame, content, app),
        Page::Sell => trade::render_sell(frame, content, app),
        Page::Holdings => holdings::render(frame, content, app),
        Page::History => history::render(frame, content, app),
    }

    let help = match (app.mode, app.page) {
        (Mode::Insert, _) => "[0-9 .]quantity [Enter]submit [Esc]cancel",
        (Mode::Confirm, _) => "[y]confirm reset [n]cancel",
        (_, Page::Prices | Page::History) => {
            "[←→]column [s]sort [r]efresh [1-5]page [Tab]next [R]eset [q]uit"
        }
        (_, Page::Buy) => "[↑↓]symbol [i]quantity [r]efresh [1-5]page [Tab]next [R]eset [q]uit",
        (_, Page::Sell) => {
            "[↑↓]symbol [i]quantity [m]ax [r]efresh [1-5]page [Tab]next [R]eset [q]uit"
        }
        (_, Page::Holdings) => "[r]efresh [1-5]page [Tab]next [R]eset [q]uit",
    };
    let para = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(para, main_layout[3]);
}
