use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::state::AppState;

/// First visible row that keeps `current` on screen, with the cursor kept
/// near the bottom once the list scrolls.
pub fn scroll_offset(current: usize, visible: usize) -> usize {
    if visible == 0 {
        return current;
    }
    current.saturating_sub(visible - 1)
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub fn draw_sidebar(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(session) = state.session() else {
        return;
    };

    let visible = area.height.saturating_sub(2) as usize;
    let current = session.current_index();
    let total = session.items().len();
    let offset = scroll_offset(current, visible);
    // cursor + icon + number + kind
    let title_max_len = area.width.saturating_sub(15) as usize;

    let mut lines: Vec<Line> = Vec::new();
    for (i, item) in session.items().iter().enumerate().skip(offset).take(visible) {
        let answered = session.is_answered(&item.id);
        let (icon, color) = if answered {
            ("✓", Color::Green)
        } else {
            ("○", Color::White)
        };

        let is_current = i == current;
        let style = if is_current {
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let bg = if is_current { Color::DarkGray } else { Color::Reset };

        lines.push(Line::from(vec![
            Span::styled(if is_current { " ▸ " } else { "   " }, style),
            Span::styled(format!("{} ", icon), Style::default().fg(color).bg(bg)),
            Span::styled(format!("{:>2}. ", i + 1), style),
            Span::styled(
                format!("{:<5} ", item.kind.as_str()),
                Style::default().fg(Color::DarkGray).bg(bg),
            ),
            Span::styled(truncate(&single_line(&item.question), title_max_len), style),
        ]));
    }

    let block = Block::default()
        .borders(Borders::RIGHT)
        .title(format!(" {} Questions ", total))
        .title_style(Style::default().add_modifier(Modifier::BOLD));

    f.render_widget(Paragraph::new(lines).block(block), area);

    if total > visible {
        let scrollbar_area = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: visible as u16,
        };
        let mut scrollbar_state = ScrollbarState::new(total.saturating_sub(1))
            .position(current)
            .viewport_content_length(3);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        f.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }
}
