//! Transaction history page.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Cell, Paragraph, Row, Table},
};
use rust_decimal::Decimal;

use super::{bordered, gain_color, header_cell, render_placeholder};
use crate::format::{format_crypto_amount, format_currency, format_price, format_timestamp};
use crate::models::{Transaction, TransactionType};
use crate::tui::app::App;
use crate::views::{ProfitLoss, TransactionColumn, TransactionHistory};

const TITLE: &str = "Transaction History";

/// Renders the transaction history page.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let history = &app.history;

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    if let Some(error) = history.error() {
        frame.render_widget(
            Paragraph::new(Span::styled(error.to_string(), Style::default().fg(Color::Red))),
            layout[1],
        );
    }

    if history.is_empty() {
        let (text, color) = if history.is_loading() {
            ("Loading transactions...", Color::Yellow)
        } else {
            ("No transactions yet.", Color::DarkGray)
        };
        render_placeholder(frame, layout[0], TITLE, text, color);
        return;
    }

    let mut header_cells: Vec<Cell> = TransactionColumn::ALL
        .iter()
        .enumerate()
        .map(|(i, column)| {
            header_cell(
                column.title(),
                history.sort.indicator(*column),
                i == app.column_cursor,
            )
        })
        .collect();
    header_cells.push(
        Cell::from("Profit/Loss")
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    );

    let rows = history
        .rows()
        .into_iter()
        .map(|tx| transaction_row(history, tx));

    let widths = [
        Constraint::Length(6),
        Constraint::Length(20),
        Constraint::Length(5),
        Constraint::Length(10),
        Constraint::Length(18),
        Constraint::Length(14),
        Constraint::Length(14),
        Constraint::Min(12),
    ];

    let table = Table::new(rows, widths)
        .header(Row::new(header_cells))
        .block(bordered(TITLE))
        .column_spacing(1);
    frame.render_widget(table, layout[0]);
}

fn transaction_row(history: &TransactionHistory, tx: &Transaction) -> Row<'static> {
    let type_color = match tx.transaction_type {
        TransactionType::Buy => Color::Green,
        TransactionType::Sell => Color::Red,
    };

    let profit_loss = history.profit_loss(tx);
    let pl_style = match profit_loss {
        ProfitLoss::Unrealized(amount) => Style::default().fg(gain_color(amount >= Decimal::ZERO)),
        ProfitLoss::Pending | ProfitLoss::Realized => Style::default().fg(Color::DarkGray),
    };

    Row::new(vec![
        Cell::from(tx.id.to_string()),
        Cell::from(format_timestamp(tx.transaction_date)),
        Cell::from(tx.transaction_type.as_str()).style(Style::default().fg(type_color)),
        Cell::from(tx.crypto_symbol.clone()),
        Cell::from(format_crypto_amount(Some(tx.amount))),
        Cell::from(format_price(Some(tx.price))),
        Cell::from(format_currency(Some(tx.total_value))),
        Cell::from(profit_loss.label()).style(pl_style),
    ])
}
