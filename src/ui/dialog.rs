use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use ficous_quiz::timer::format_clock;

use crate::state::{AppState, Dialog};

pub fn draw_dialog(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(dialog) = state.top_dialog() else {
        return;
    };

    match dialog {
        Dialog::ConfirmFinish => draw_confirm_finish(f, area, state),
        Dialog::ConfirmReset => draw_confirm(
            f,
            area,
            "Start over?",
            &["All answers will be cleared", "and the timer reset to 30:00."],
        ),
        Dialog::ConfirmQuit => draw_confirm(
            f,
            area,
            "Quit?",
            &["Answers are not saved and", "nothing is sent for grading."],
        ),
        Dialog::TimeWarning => draw_time_warning(f, area, state),
        Dialog::Help => draw_help(f, area),
    }
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn confirm_footer() -> Line<'static> {
    Line::from(vec![
        Span::styled("   [Enter] Confirm", Style::default().fg(Color::Green)),
        Span::raw("    "),
        Span::styled("[Esc] Cancel", Style::default().fg(Color::DarkGray)),
    ])
}

fn render_box(f: &mut Frame, area: Rect, width: u16, lines: Vec<Line>, border: Color) {
    let rect = centered_rect(width, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));
    f.render_widget(Paragraph::new(lines).block(block), rect);
}

fn draw_confirm(f: &mut Frame, area: Rect, title: &str, body: &[&str]) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   {}", title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(body.iter().map(|l| Line::from(format!("   {}", l))));
    lines.push(Line::from(""));
    lines.push(confirm_footer());
    render_box(f, area, 40, lines, Color::Yellow);
}

fn draw_confirm_finish(f: &mut Frame, area: Rect, state: &AppState) {
    let unanswered = state.session().map_or(0, |s| s.unanswered_count());
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Finish and submit for grading?",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if unanswered > 0 {
        let noun = if unanswered == 1 { "question is" } else { "questions are" };
        lines.push(Line::from(Span::styled(
            format!("   {} {} not answered.", unanswered, noun),
            Style::default().fg(Color::White),
        )));
    } else {
        lines.push(Line::from("   All questions are answered."));
    }
    lines.push(Line::from("   Answers cannot be changed afterwards."));
    lines.push(Line::from(""));
    lines.push(confirm_footer());
    render_box(f, area, 44, lines, Color::Yellow);
}

fn draw_time_warning(f: &mut Frame, area: Rect, state: &AppState) {
    let remaining = state.session().map_or(0, |s| s.time_remaining());
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("   ⚠  {} REMAINING", format_clock(remaining)),
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("   The quiz is submitted for grading"),
        Line::from("   automatically when time runs out."),
        Line::from(""),
        Line::from(Span::styled(
            "          [Enter] Continue",
            Style::default().fg(Color::Green),
        )),
    ];
    render_box(f, area, 42, lines, Color::Red);
}

fn draw_help(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "   Key Bindings",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("   Ctrl+P     Start/pause the timer"),
        Line::from("   ←/→        Previous/Next question"),
        Line::from("   PgUp/PgDn  Jump 5 questions"),
        Line::from("   Home/End   First/Last question"),
        Line::from("   a-z        Select/toggle choice"),
        Line::from("   ↑/↓ Space  Move and select choice"),
        Line::from("   Enter      Edit open answer"),
        Line::from("   Ctrl+E     Open $EDITOR (open)"),
        Line::from("   Ctrl+S     Finish and grade"),
        Line::from("   Ctrl+R     Reset the attempt"),
        Line::from("   Ctrl+Q     Quit"),
        Line::from("   ? / F1     This help"),
        Line::from("   Esc        Close dialog"),
        Line::from(""),
        Line::from(Span::styled(
            "        [Esc] Close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let rect = centered_rect(44, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .border_style(Style::default().fg(Color::Cyan));
    f.render_widget(Paragraph::new(lines).block(block), rect);
}
