use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Padding, Paragraph, Wrap};
use ratatui::Frame;

use ficous_quiz::model::{ExerciseGradeOut, ItemResult};
use ficous_quiz::session::{Phase, QuizSession};
use ficous_quiz::timer::format_clock;
use ficous_quiz::TOTAL_TIME;

use crate::state::AppState;

pub fn draw_results(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(session) = state.session() else {
        return;
    };

    match session.phase() {
        Phase::Graded => draw_graded(f, area, state, session),
        Phase::GradeFailed => draw_grade_failed(f, area, session),
        _ => draw_grading(f, area, session),
    }
}

fn footer(text: &'static str) -> Line<'static> {
    Line::from(Span::styled(text, Style::default().fg(Color::DarkGray)))
}

fn draw_grading(f: &mut Frame, area: Rect, session: &QuizSession) {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Grading...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!(
            "Sent {} of {} answers.",
            session.answered_count(),
            session.items().len()
        )),
        Line::from(""),
        footer("[Ctrl+Q] Quit"),
    ];

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(widget, area);
}

fn draw_grade_failed(f: &mut Frame, area: Rect, session: &QuizSession) {
    let message = session
        .grade_error()
        .map(ToString::to_string)
        .unwrap_or_default();

    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "✗  Grading Failed",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message),
        Line::from(""),
        Line::from("Your answers were not graded."),
        Line::from(""),
        footer("[Ctrl+R] Start over    [Enter] Exit"),
    ];

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn item_line(index: usize, question: &str, result: Option<&ItemResult>) -> Vec<Line<'static>> {
    let question: String = question.split_whitespace().collect::<Vec<_>>().join(" ");
    let (icon, color) = match result.and_then(|r| r.correct) {
        Some(true) => ("✓", Color::Green),
        Some(false) => ("✗", Color::Red),
        None => ("·", Color::DarkGray),
    };

    let mut header = vec![
        Span::styled(format!("{} ", icon), Style::default().fg(color)),
        Span::styled(
            format!("{:>2}. ", index + 1),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(question),
    ];
    if let Some(score) = result.and_then(|r| r.score) {
        header.push(Span::styled(
            format!("  ({:.1})", score),
            Style::default().fg(Color::Cyan),
        ));
    }
    if let Some(similarity) = result.and_then(|r| r.similarity) {
        header.push(Span::styled(
            format!("  similarity {:.0}%", similarity * 100.0),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let mut lines = vec![Line::from(header)];
    let notes = result
        .into_iter()
        .flat_map(|r| [r.feedback.as_deref(), r.explanation.as_deref()])
        .flatten();
    for note in notes {
        lines.push(Line::from(Span::styled(
            format!("      {}", note),
            Style::default().fg(Color::Gray),
        )));
    }
    lines
}

fn summary_lines(state: &AppState, session: &QuizSession, grade: &ExerciseGradeOut) -> Vec<Line<'static>> {
    let score = &grade.score;
    let (verdict, color) = if score.passed() {
        ("Passed", Color::Green)
    } else {
        ("Below passing", Color::Red)
    };

    let used = TOTAL_TIME.saturating_sub(session.time_remaining());
    let mut timing = format!("Time used {}", format_clock(used));
    if let Some(started) = state.started_at {
        timing.push_str(&format!("    started {}", started.format("%H:%M")));
    }
    if let Some(finished) = state.finished_at {
        timing.push_str(&format!("    finished {}", finished.format("%H:%M")));
    }

    vec![
        Line::from(Span::styled(
            format!("{}%", score.percent_rounded()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(verdict, Style::default().fg(color))),
        Line::from(format!("{} / {} points", score.raw, score.max)),
        Line::from(format!(
            "{} of {} questions answered",
            session.answered_count(),
            session.items().len()
        )),
        Line::from(Span::styled(timing, Style::default().fg(Color::DarkGray))),
        Line::from(""),
    ]
}

fn draw_graded(f: &mut Frame, area: Rect, state: &AppState, session: &QuizSession) {
    let Some(grade) = session.result() else {
        return;
    };

    let mut lines = summary_lines(state, session, grade);
    lines.push(Line::from(Span::styled(
        "─".repeat(area.width.saturating_sub(6) as usize),
        Style::default().fg(Color::DarkGray),
    )));
    for (i, item) in session.items().iter().enumerate() {
        let result = grade.items_results.iter().find(|r| r.item_id == item.id);
        lines.extend(item_line(i, &item.question, result));
    }
    lines.push(Line::from(""));
    lines.push(footer("[↑/↓] Scroll    [Ctrl+R] Try again    [Enter] Exit"));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} · Results ", state.controller.title()))
        .title_style(Style::default().add_modifier(Modifier::BOLD))
        .padding(Padding::horizontal(2));
    let widget = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((state.results_scroll, 0));
    f.render_widget(widget, area);
}
