//! Holdings page.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table},
};

use super::{bordered, render_placeholder};
use crate::format::{
    NOT_AVAILABLE, format_crypto_amount, format_currency, format_price, format_timestamp,
};
use crate::tui::app::App;

const TITLE: &str = "Your Holdings";

/// Renders the holdings page.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let view = &app.holdings;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Portfolio summary
            Constraint::Min(3),    // Holdings table
            Constraint::Length(1), // Fetch error
        ])
        .split(area);

    let summary = Line::from(vec![
        Span::styled("Cash: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format_currency(view.balance()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("   "),
        Span::styled("Holdings: ", Style::default().fg(Color::DarkGray)),
        Span::raw(format_currency(Some(view.total_value()))),
        Span::raw("   "),
        Span::styled("Total assets: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format_currency(Some(view.total_assets())),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(summary).block(bordered("Portfolio")),
        layout[0],
    );

    if let Some(error) = view.error() {
        frame.render_widget(
            Paragraph::new(Span::styled(error.to_string(), Style::default().fg(Color::Red))),
            layout[2],
        );
    }

    if view.rows().is_empty() {
        let (text, color) = if view.is_loading() {
            ("Loading holdings...", Color::Yellow)
        } else {
            ("You don't have any cryptocurrency holdings yet.", Color::DarkGray)
        };
        render_placeholder(frame, layout[1], TITLE, text, color);
        return;
    }

    let header = Row::new(
        ["Symbol", "Name", "Amount", "Price", "Value", "Last Updated"]
            .into_iter()
            .map(|title| {
                Cell::from(title)
                    .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            }),
    );

    let rows = view.rows().iter().map(|holding| {
        Row::new(vec![
            Cell::from(holding.symbol.clone()),
            Cell::from(
                holding
                    .name
                    .clone()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
            Cell::from(format_crypto_amount(Some(holding.balance))),
            Cell::from(format_price(holding.current_price)),
            Cell::from(format_currency(holding.current_value))
                .style(Style::default().fg(Color::White)),
            Cell::from(format_timestamp(holding.last_updated)),
        ])
    });

    let widths = [
        Constraint::Length(10),
        Constraint::Min(12),
        Constraint::Length(18),
        Constraint::Length(14),
        Constraint::Length(16),
        Constraint::Length(20),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(bordered(TITLE))
        .column_spacing(1);
    frame.render_widget(table, layout[1]);
}
