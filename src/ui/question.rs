use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};
use ratatui::Frame;

use ficous_quiz::model::{choice_label, ExerciseItem, ItemKind};

use crate::state::{AppState, InputMode};
use crate::ui::markdown::markdown_to_lines;

fn choice_marker(kind: ItemKind, selected: bool) -> &'static str {
    match (kind, selected) {
        (ItemKind::Multi, true) => "[x]",
        (ItemKind::Multi, false) => "[ ]",
        (_, true) => "(●)",
        (_, false) => "( )",
    }
}

fn choice_lines(state: &AppState, item: &ExerciseItem) -> Vec<Line<'static>> {
    let focused = state.input_mode == InputMode::ChoiceSelect;
    item.choices()
        .iter()
        .enumerate()
        .map(|(i, choice)| {
            let selected = state.is_choice_selected(&item.id, i);
            let under_cursor = focused && i == state.choice_cursor;
            let style = match (selected, under_cursor) {
                (true, _) => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                (false, true) => Style::default().fg(Color::White),
                (false, false) => Style::default().fg(Color::Gray),
            };
            let style = if under_cursor {
                style.bg(Color::Rgb(40, 40, 40))
            } else {
                style
            };
            let letter = choice_label(i);
            Line::from(vec![
                Span::styled(if under_cursor { " ▸ " } else { "   " }, style),
                Span::styled(format!("{} {}. ", choice_marker(item.kind, selected), letter), style),
                Span::styled(choice.to_string(), style),
            ])
        })
        .collect()
}

/// The open answer with the cursor drawn as a reversed cell.
fn text_lines(state: &AppState) -> Vec<Line<'static>> {
    let editing = state.input_mode == InputMode::TextInput;
    if state.text_input.is_empty() && !editing {
        return vec![Line::from(Span::styled(
            "Type your answer…",
            Style::default().fg(Color::DarkGray),
        ))];
    }

    let cursor_style = Style::default().add_modifier(Modifier::REVERSED);
    let mut lines = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, spans: &mut Vec<Span<'static>>| {
        if !current.is_empty() {
            spans.push(Span::raw(std::mem::take(current)));
        }
    };

    for (i, c) in state.text_input.chars().enumerate() {
        let at_cursor = editing && i == state.text_cursor;
        if c == '\n' {
            flush(&mut current, &mut spans);
            if at_cursor {
                spans.push(Span::styled(" ", cursor_style));
            }
            lines.push(Line::from(std::mem::take(&mut spans)));
            continue;
        }
        if at_cursor {
            flush(&mut current, &mut spans);
            spans.push(Span::styled(c.to_string(), cursor_style));
        } else {
            current.push(c);
        }
    }
    flush(&mut current, &mut spans);
    if editing && state.text_cursor >= state.text_input.chars().count() {
        spans.push(Span::styled(" ", cursor_style));
    }
    lines.push(Line::from(spans));
    lines
}

pub fn draw_question(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(session) = state.session() else {
        return;
    };
    let Some(item) = session.current_item() else {
        let widget = Paragraph::new("This exercise has no questions. Press Ctrl+Q to quit.")
            .block(Block::default().padding(Padding::horizontal(1)));
        f.render_widget(widget, area);
        return;
    };

    let mut lines: Vec<Line> = vec![
        Line::from(vec![
            Span::styled(
                format!("Question {}", session.current_index() + 1),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ·  {}", item.kind.label()),
                Style::default().fg(Color::DarkGray),
            ),
            if session.is_answered(&item.id) {
                Span::styled("  ✓ answered", Style::default().fg(Color::Green))
            } else {
                Span::raw("")
            },
        ]),
        Line::from(""),
    ];

    lines.extend(markdown_to_lines(&item.question));
    // markdown_to_lines ends paragraphs with a blank line
    if lines.last().is_some_and(|l| l.width() > 0) {
        lines.push(Line::from(""));
    }

    match item.kind {
        ItemKind::Open => {
            let editing = state.input_mode == InputMode::TextInput;
            lines.push(Line::from(Span::styled(
                if editing {
                    "Answer (Esc to stop editing, Ctrl+E for $EDITOR):"
                } else {
                    "Answer (Enter to edit):"
                },
                Style::default().fg(Color::DarkGray),
            )));
            lines.push(Line::from(Span::styled(
                "─".repeat(area.width.saturating_sub(4) as usize),
                Style::default().fg(if editing { Color::Cyan } else { Color::DarkGray }),
            )));
            lines.extend(text_lines(state));
        }
        _ => lines.extend(choice_lines(state, item)),
    }

    if !session.is_running() && session.time_remaining() == ficous_quiz::TOTAL_TIME {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "The timer has not started. Press Ctrl+P to start it.",
            Style::default().fg(Color::Yellow),
        )));
    }

    let block = Block::default()
        .borders(Borders::NONE)
        .padding(Padding::new(2, 1, 1, 0));
    let widget = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((state.question_scroll, 0));
    f.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_follow_kind() {
        assert_eq!(choice_marker(ItemKind::Mcq, true), "(●)");
        assert_eq!(choice_marker(ItemKind::Vf, false), "( )");
        assert_eq!(choice_marker(ItemKind::Multi, true), "[x]");
        assert_eq!(choice_marker(ItemKind::Multi, false), "[ ]");
    }
}
