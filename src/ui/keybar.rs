use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::{AppState, InputMode};

pub fn draw_keybar(f: &mut Frame, area: Rect, state: &AppState) {
    let pause = if state.is_running() { "pause" } else { "start" };

    let bindings: Vec<(&str, &str)> = match state.input_mode {
        InputMode::TextInput => vec![
            ("type", "answer"),
            ("Esc", "done editing"),
            ("Ctrl+E", "editor"),
            ("Ctrl+P", pause),
            ("Ctrl+S", "finish"),
            ("Ctrl+Q", "quit"),
        ],
        InputMode::ChoiceSelect => vec![
            ("a-z", "answer"),
            ("←/→", "prev/next"),
            ("Ctrl+P", pause),
            ("Ctrl+S", "finish"),
            ("Ctrl+R", "reset"),
            ("Ctrl+Q", "quit"),
            ("?", "help"),
        ],
        InputMode::Navigation => vec![
            ("←/→", "prev/next"),
            ("PgUp/PgDn", "jump 5"),
            ("Ctrl+P", pause),
            ("Ctrl+S", "finish"),
            ("Ctrl+R", "reset"),
            ("Ctrl+Q", "quit"),
            ("?", "help"),
        ],
    };

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, action)) in bindings.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {}", action)));
    }

    let widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(20, 20, 20)));
    f.render_widget(widget, area);
}
