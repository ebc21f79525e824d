//! Live price table.

use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Style},
    widgets::{Cell, Row, Table},
};

use super::{bordered, header_cell, render_placeholder};
use crate::format::{NOT_AVAILABLE, format_price, format_timestamp, format_volume};
use crate::models::{PriceQuote, SpreadState};
use crate::tui::app::App;
use crate::views::PriceColumn;

const TITLE: &str = "Cryptocurrency Prices";

/// Renders the price table page.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let table = &app.prices;

    if table.is_empty() {
        let (text, color) = if let Some(error) = table.error() {
            (error, Color::Red)
        } else if table.is_loading() {
            ("Loading prices...", Color::Yellow)
        } else {
            ("No cryptocurrency data available", Color::DarkGray)
        };
        render_placeholder(frame, area, TITLE, text, color);
        return;
    }

    let header = Row::new(PriceColumn::ALL.iter().enumerate().map(|(i, column)| {
        header_cell(
            column.title(),
            table.sort.indicator(*column),
            i == app.column_cursor,
        )
    }));

    let rows = table.rows().into_iter().map(price_row);

    let widths = [
        Constraint::Length(10),
        Constraint::Min(12),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Length(16),
        Constraint::Length(20),
    ];

    let widget = Table::new(rows, widths)
        .header(header)
        .block(bordered(TITLE))
        .column_spacing(1);
    frame.render_widget(widget, area);
}

fn price_row(quote: &PriceQuote) -> Row<'static> {
    let spread_style = match quote.spread_state() {
        SpreadState::Normal => Style::default(),
        SpreadState::Wide => Style::default().fg(Color::Yellow),
        SpreadState::Inverted => Style::default().fg(Color::Magenta),
    };

    Row::new(vec![
        Cell::from(quote.symbol.clone()),
        Cell::from(quote.name.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())),
        Cell::from(format_price(quote.price)).style(Style::default().fg(Color::White)),
        Cell::from(format_price(quote.ask_price)).style(spread_style),
        Cell::from(format_price(quote.bid_price)).style(spread_style),
        Cell::from(format_volume(quote.volume_24h)),
        Cell::from(format_timestamp(quote.last_updated)),
    ])
}
