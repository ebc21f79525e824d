//! Status bar component.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::format::format_currency;
use crate::tui::app::{App, Mode, NoticeKind};
use crate::websocket::StreamStatus;

/// Renders the status bar.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let status_color = match app.stream_status {
        StreamStatus::Connected => Color::Green,
        StreamStatus::Connecting => Color::Yellow,
        StreamStatus::Disconnected => Color::Red,
    };

    let last_update = match app.last_price_update {
        Some(at) => format!(" {}s ago ", at.elapsed().as_secs()),
        None => " no prices yet ".to_string(),
    };

    let balance_span = match app.cash_balance() {
        Some(balance) => Span::styled(
            format!(" Cash {} ", format_currency(Some(balance))),
            Style::default().fg(Color::Cyan),
        ),
        None => Span::raw(""),
    };

    let notice_span = if app.mode == Mode::Confirm {
        Span::styled(
            " Reset account to its starting balance? [y/n] ",
            Style::default().fg(Color::Yellow),
        )
    } else if app.account.is_resetting() {
        Span::styled(" Resetting account... ", Style::default().fg(Color::Yellow))
    } else if let Some(ref notice) = app.notice {
        let color = match notice.kind {
            NoticeKind::Info => Color::Green,
            NoticeKind::Error => Color::Red,
        };
        Span::styled(format!(" {} ", notice.message), Style::default().fg(color))
    } else {
        Span::raw("")
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", app.stream_status.label()),
            Style::default().fg(status_color),
        ),
        Span::styled(last_update, Style::default().fg(Color::White)),
        Span::raw("│"),
        balance_span,
        Span::raw("│"),
        notice_span,
    ]);

    let para = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}
