//! Transcript drawing: style conversion, scrolling, copy hit-map.

use std::time::Instant;

use delia_core::api::Agent;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::state::{CopyTarget, TranscriptState};
use super::style::{Style as TranscriptStyle, StyledLine};
use crate::common::Scrollbar;

/// Draws the visible slice of the transcript and records where the copy
/// affordances ended up. Returns the matching scrollbar.
pub fn render_transcript(
    frame: &mut Frame,
    area: Rect,
    transcript: &TranscriptState,
    agent: Agent,
    now: Instant,
) -> Scrollbar {
    if transcript.is_empty() {
        transcript.set_copy_targets(Vec::new());
        transcript.set_max_scroll(0);
        let welcome: Vec<Line<'static>> = welcome_lines(agent)
            .into_iter()
            .map(convert_styled_line)
            .collect();
        frame.render_widget(Paragraph::new(welcome), area);
        return Scrollbar::default();
    }

    let rendered = transcript.lines(now);
    let height = usize::from(area.height);
    let total = rendered.lines.len();
    let max_scroll = total.saturating_sub(height);
    transcript.set_max_scroll(max_scroll);

    let offset = transcript.scroll_offset().min(max_scroll);
    let start = total.saturating_sub(height + offset);
    let end = (start + height).min(total);

    let targets = rendered
        .copy_rows
        .iter()
        .filter(|(line, _, _)| (start..end).contains(line))
        .filter_map(|&(line, cell, block)| {
            let row = u16::try_from(line - start).ok()?;
            Some(CopyTarget {
                row: area.y + row,
                cell,
                block,
            })
        })
        .collect();
    transcript.set_copy_targets(targets);

    let lines: Vec<Line<'static>> = rendered
        .lines
        .into_iter()
        .skip(start)
        .take(end - start)
        .map(convert_styled_line)
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
    Scrollbar::new(total, height, offset)
}

fn welcome_lines(agent: Agent) -> Vec<StyledLine> {
    let body = match agent {
        Agent::Documents => {
            "Ask anything about the documents in your knowledge base. Upload more with /upload <path>."
        }
        Agent::Edsl => {
            "EDSL (Experian Domain Specific Language) expert. Ask me anything about PowerCurve."
        }
    };
    vec![
        StyledLine::empty(),
        StyledLine::plain("  Welcome to DELIA!", TranscriptStyle::H2),
        StyledLine::empty(),
        StyledLine::plain(format!("  {body}"), TranscriptStyle::System),
        StyledLine::plain("  Type /help for commands.", TranscriptStyle::Timestamp),
    ]
}

pub fn convert_styled_line(styled_line: StyledLine) -> Line<'static> {
    let spans: Vec<Span<'static>> = styled_line
        .spans
        .into_iter()
        .map(|s| Span::styled(s.text, convert_style(s.style)))
        .collect();
    Line::from(spans)
}

pub fn convert_style(style: TranscriptStyle) -> Style {
    match style {
        TranscriptStyle::Plain => Style::default(),
        TranscriptStyle::UserPrefix => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        TranscriptStyle::User => Style::default().fg(Color::Green),
        TranscriptStyle::AssistantPrefix => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
        TranscriptStyle::Assistant => Style::default().fg(Color::White),
        TranscriptStyle::SystemPrefix => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::BOLD),
        TranscriptStyle::System => Style::default().fg(Color::Gray),
        TranscriptStyle::Error => Style::default().fg(Color::Red),
        TranscriptStyle::Timestamp => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::DIM),
        TranscriptStyle::Loading => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::ITALIC),

        TranscriptStyle::CodeInline | TranscriptStyle::CodeBlock => {
            Style::default().fg(Color::Cyan)
        }
        TranscriptStyle::Syntax(rgb) => Style::default().fg(Color::Rgb(rgb.r, rgb.g, rgb.b)),
        TranscriptStyle::CodeFence => Style::default().fg(Color::DarkGray),
        TranscriptStyle::CopyLabel => Style::default()
            .fg(Color::Blue)
            .add_modifier(Modifier::UNDERLINED),
        TranscriptStyle::CopiedLabel => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        TranscriptStyle::Emphasis => Style::default().add_modifier(Modifier::ITALIC),
        TranscriptStyle::Strong => Style::default().add_modifier(Modifier::BOLD),
        TranscriptStyle::H1 => Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        TranscriptStyle::H2 => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
        TranscriptStyle::H3 => Style::default()
            .fg(Color::LightMagenta)
            .add_modifier(Modifier::BOLD),
        TranscriptStyle::H4 => Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        TranscriptStyle::MinorHeading => Style::default().add_modifier(Modifier::ITALIC),
        TranscriptStyle::Link => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::UNDERLINED),
        TranscriptStyle::BlockQuote => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::ITALIC),
        TranscriptStyle::ListBullet | TranscriptStyle::ListNumber => {
            Style::default().fg(Color::Yellow)
        }
        TranscriptStyle::ListItem => Style::default().fg(Color::Gray),
        TranscriptStyle::Rule => Style::default().fg(Color::DarkGray),
    }
}
