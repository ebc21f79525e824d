//! Buy and sell forms.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use rust_decimal::Decimal;

use super::{bordered, gain_color};
use crate::format::{format_crypto_amount, format_currency, format_price};
use crate::tui::app::{App, Mode};
use crate::views::{QuantityInput, TradeState};

/// Renders the buy page.
pub fn render_buy(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.buy;
    let [list_area, form_area] = split(area);

    let items = form
        .available()
        .iter()
        .map(|quote| {
            let label = match quote.name.as_deref() {
                Some(name) => format!("{name} ({})", quote.symbol),
                None => quote.symbol.clone(),
            };
            symbol_item(
                label,
                format_price(quote.price),
                form.symbol() == Some(quote.symbol.as_str()),
            )
        })
        .collect();
    render_symbol_list(frame, list_area, "Cryptocurrencies", items, form.is_loading());

    let mut lines = vec![
        field("Symbol", form.symbol().unwrap_or("-").to_string()),
        field("Current price", format_price(form.current_price())),
        field("Available balance", format_currency(form.balance())),
        Line::raw(""),
    ];
    let total = form.total_cost();
    let over_budget = form.balance().is_some_and(|balance| total > balance);
    lines.push(Line::from(vec![
        Span::styled("Total cost: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format_currency(Some(total)),
            Style::default().fg(if over_budget { Color::Red } else { Color::White }),
        ),
    ]));

    render_form(
        frame,
        form_area,
        FormContent {
            title: "Buy Cryptocurrency",
            lines,
            quantity: &form.quantity,
            editing: app.mode == Mode::Insert,
            state: form.state(),
            load_error: form.load_error(),
        },
    );
}

/// Renders the sell page.
pub fn render_sell(frame: &mut Frame, area: Rect, app: &App) {
    let form = &app.sell;
    let [list_area, form_area] = split(area);

    let items = form
        .holdings()
        .iter()
        .map(|holding| {
            symbol_item(
                holding.label(),
                format_crypto_amount(Some(holding.balance)),
                form.symbol() == Some(holding.symbol.as_str()),
            )
        })
        .collect();
    render_symbol_list(frame, list_area, "Your Holdings", items, form.is_loading());

    if !form.is_loading() && form.holdings().is_empty() && form.load_error().is_none() {
        let para = Paragraph::new(Span::styled(
            "You don't have any cryptocurrencies to sell.",
            Style::default().fg(Color::DarkGray),
        ))
        .block(bordered("Sell Cryptocurrency"));
        frame.render_widget(para, form_area);
        return;
    }

    let value = form.total_value();
    let lines = vec![
        field("Symbol", form.symbol().unwrap_or("-").to_string()),
        field("Held", format_crypto_amount(form.held())),
        field("Current price", format_price(form.current_price())),
        field("Cash balance", format_currency(form.balance())),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Total value: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format_currency(Some(value)),
                Style::default().fg(gain_color(value >= Decimal::ZERO)),
            ),
        ]),
    ];

    render_form(
        frame,
        form_area,
        FormContent {
            title: "Sell Cryptocurrency",
            lines,
            quantity: &form.quantity,
            editing: app.mode == Mode::Insert,
            state: form.state(),
            load_error: form.load_error(),
        },
    );
}

struct FormContent<'a> {
    title: &'a str,
    lines: Vec<Line<'static>>,
    quantity: &'a QuantityInput,
    editing: bool,
    state: &'a TradeState,
    load_error: Option<&'a str>,
}

fn split(area: Rect) -> [Rect; 2] {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);
    [layout[0], layout[1]]
}

fn field(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn symbol_item(label: String, detail: String, selected: bool) -> ListItem<'static> {
    let marker = if selected { "▶ " } else { "  " };
    let style = if selected {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    ListItem::new(Line::from(vec![
        Span::styled(format!("{marker}{label}"), style),
        Span::styled(format!("  {detail}"), Style::default().fg(Color::DarkGray)),
    ]))
}

fn render_symbol_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    items: Vec<ListItem<'static>>,
    loading: bool,
) {
    if loading && items.is_empty() {
        let para = Paragraph::new(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ))
        .block(bordered(title));
        frame.render_widget(para, area);
        return;
    }
    frame.render_widget(List::new(items).block(bordered(title)), area);
}

fn render_form(frame: &mut Frame, area: Rect, content: FormContent<'_>) {
    let block = bordered(content.title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(content.lines.len() as u16),
            Constraint::Length(3), // Quantity input
            Constraint::Min(1),    // Outcome
        ])
        .split(inner);

    frame.render_widget(Paragraph::new(content.lines), layout[0]);

    let input_style = if content.editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title = if content.editing {
        " Quantity (INSERT) "
    } else {
        " Quantity "
    };
    let input_block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(input_style);
    let input_inner = input_block.inner(layout[1]);
    frame.render_widget(
        Paragraph::new(content.quantity.as_str().to_string()).block(input_block),
        layout[1],
    );
    if content.editing {
        frame.set_cursor_position((
            input_inner.x + content.quantity.cursor_column(),
            input_inner.y,
        ));
    }

    let outcome = match content.state {
        TradeState::Idle => content
            .load_error
            .map(|error| Span::styled(error.to_string(), Style::default().fg(Color::Red))),
        TradeState::Validating => Some(Span::styled(
            "Validating...",
            Style::default().fg(Color::Yellow),
        )),
        TradeState::Submitting => Some(Span::styled(
            "Processing...",
            Style::default().fg(Color::Yellow),
        )),
        TradeState::Succeeded(message) => Some(Span::styled(
            message.clone(),
            Style::default().fg(Color::Green),
        )),
        TradeState::Failed(message) => Some(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )),
    };
    if let Some(span) = outcome {
        frame.render_widget(Paragraph::new(span), layout[2]);
    }
}
