//! Page renderers.

pub mod history;
pub mod holdings;
pub mod prices;
pub mod trade;

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, Cell, Paragraph},
};

/// Header cell of a sortable column.
///
/// The active sort column carries its direction arrow; the column under the
/// cursor is highlighted.
fn header_cell(title: &str, arrow: Option<&str>, under_cursor: bool) -> Cell<'static> {
    let text = match arrow {
        Some(arrow) => format!("{title} {arrow}"),
        None => title.to_string(),
    };
    let style = if under_cursor {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    };
    Cell::from(text).style(style)
}

fn bordered(title: &str) -> Block<'static> {
    Block::default()
        .title(format!(" {title} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
}

/// Fills `area` with a single placeholder line (loading, error, empty).
fn render_placeholder(frame: &mut Frame, area: Rect, title: &str, text: &str, color: Color) {
    let para = Paragraph::new(Span::styled(text.to_string(), Style::default().fg(color)))
        .block(bordered(title));
    frame.render_widget(para, area);
}

/// Green for gains, red for losses.
fn gain_color(positive: bool) -> Color {
    if positive { Color::Green } else { Color::Red }
}
