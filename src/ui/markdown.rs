use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Render question Markdown into styled lines. Paragraphs and headings are
/// followed by a blank line.
pub fn markdown_to_lines(text: &str) -> Vec<Line<'static>> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(text, opts);
    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut current_spans: Vec<Span<'static>> = Vec::new();
    let mut style_stack: Vec<Style> = vec![Style::default()];
    let mut in_code_block = false;

    let push_style = |stack: &mut Vec<Style>, f: fn(Style) -> Style| {
        let current = *stack.last().unwrap_or(&Style::default());
        stack.push(f(current));
    };

    for event in parser {
        match event {
            Event::Start(Tag::Paragraph) => current_spans.clear(),
            Event::End(TagEnd::Paragraph) => {
                if !current_spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current_spans)));
                }
                lines.push(Line::from(""));
            }
            Event::Start(Tag::Strong) => {
                push_style(&mut style_stack, |s| s.add_modifier(Modifier::BOLD))
            }
            Event::Start(Tag::Emphasis) => {
                push_style(&mut style_stack, |s| s.add_modifier(Modifier::ITALIC))
            }
            Event::Start(Tag::Strikethrough) => {
                push_style(&mut style_stack, |s| s.add_modifier(Modifier::CROSSED_OUT))
            }
            Event::End(TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough) => {
                style_stack.pop();
            }
            Event::Start(Tag::Item) => {
                current_spans.clear();
                current_spans.push(Span::raw("  • "));
            }
            Event::End(TagEnd::Item) => {
                if !current_spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current_spans)));
                }
            }
            Event::End(TagEnd::List(_)) => lines.push(Line::from("")),
            Event::Start(Tag::CodeBlock(_)) => {
                current_spans.clear();
                in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code_block = false;
                lines.push(Line::from(""));
            }
            Event::Start(Tag::Heading { level, .. }) => {
                current_spans.clear();
                let prefix = match level {
                    HeadingLevel::H1 => "# ",
                    HeadingLevel::H2 => "## ",
                    HeadingLevel::H3 => "### ",
                    _ => "",
                };
                current_spans.push(Span::styled(
                    prefix,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                push_style(&mut style_stack, |s| s.add_modifier(Modifier::BOLD));
            }
            Event::End(TagEnd::Heading(_)) => {
                style_stack.pop();
                if !current_spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current_spans)));
                }
                lines.push(Line::from(""));
            }
            Event::Text(text) if in_code_block => {
                for code_line in text.lines() {
                    lines.push(Line::from(Span::styled(
                        format!("  {}", code_line),
                        Style::default().fg(Color::Green),
                    )));
                }
            }
            Event::Text(text) => {
                let style = *style_stack.last().unwrap_or(&Style::default());
                current_spans.push(Span::styled(text.to_string(), style));
            }
            Event::Code(code) => {
                current_spans.push(Span::styled(
                    format!("`{}`", code),
                    Style::default().fg(Color::Yellow),
                ));
            }
            Event::SoftBreak => current_spans.push(Span::raw(" ")),
            Event::HardBreak => {
                if !current_spans.is_empty() {
                    lines.push(Line::from(std::mem::take(&mut current_spans)));
                }
            }
            Event::Rule => {
                lines.push(Line::from(Span::styled(
                    "─".repeat(40),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            _ => {}
        }
    }

    if !current_spans.is_empty() {
        lines.push(Line::from(current_spans));
    }

    lines
}
