use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::AppState;

pub fn draw_statusbar(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(session) = state.session() else {
        return;
    };
    let total = session.items().len();

    let mut spans = vec![
        Span::raw(" "),
        Span::styled(
            format!("Question {} of {}", (session.current_index() + 1).min(total), total),
            Style::default().fg(Color::White),
        ),
        Span::raw("   "),
        Span::styled(
            format!("{:.0}%", session.progress_percent()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("   "),
        Span::styled(
            format!("✓ {} answered", session.answered_count()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("   "),
        Span::styled(
            format!("○ {} left", session.unanswered_count()),
            Style::default().fg(Color::White),
        ),
    ];

    if !session.is_running() {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            "paused · Ctrl+P to start",
            Style::default().fg(Color::Yellow),
        ));
    }

    if let Some(msg) = &state.status_message {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(msg.clone(), Style::default().fg(Color::Red)));
    }

    let widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(30, 30, 30)));
    f.render_widget(widget, area);
}
