use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use ficous_quiz::timer::{format_clock, TimeLevel};

use crate::state::AppState;

fn clock_style(level: TimeLevel, running: bool) -> Style {
    let style = match level {
        TimeLevel::Critical => Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
        TimeLevel::Warning => Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        TimeLevel::Normal => Style::default().fg(Color::Rgb(200, 200, 120)),
    };
    if running {
        style
    } else {
        style.add_modifier(Modifier::DIM)
    }
}

pub fn draw_titlebar(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(session) = state.session() else {
        return;
    };

    let running = session.is_running();
    let clock = format!(
        " {} {} ",
        if running { "▶" } else { "⏸" },
        format_clock(session.time_remaining())
    );
    let timer_span = Span::styled(clock.clone(), clock_style(session.time_level(), running));

    let title_text = format!("[ {} ]", state.controller.title());
    let title_span = Span::styled(
        title_text.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    // Title centred on the full width, clock right-aligned.
    let available = area.width as usize;
    let title_len = title_text.chars().count();
    let clock_len = clock.chars().count();
    let center_pad = available.saturating_sub(title_len) / 2;
    let right_pad = available.saturating_sub(center_pad + title_len + clock_len);

    let line = Line::from(vec![
        Span::raw(" ".repeat(center_pad)),
        title_span,
        Span::raw(" ".repeat(right_pad)),
        timer_span,
    ]);

    let widget = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    f.render_widget(widget, area);
}
