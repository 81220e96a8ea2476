//! Header bar and notice line.

use delia_core::api::Agent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::state::NoticeKind;
use crate::state::TuiState;

/// Top bar: product name and agent on the left, knowledge stats on the right.
pub fn render_header(state: &TuiState, frame: &mut Frame, area: Rect) {
    let mut left = vec![
        Span::styled(
            " DELIA ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {}", state.agent.label()),
            Style::default().fg(Color::Magenta),
        ),
    ];
    if state.agent == Agent::Edsl {
        left.push(Span::styled(
            format!(" · {} level", state.level.label()),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if state.token.is_none() {
        left.push(Span::styled(
            " · not logged in",
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(left)), area);

    let stats = Line::from(Span::styled(
        format!("{} ", state.knowledge.stats_label()),
        Style::default().fg(Color::DarkGray),
    ))
    .alignment(Alignment::Right);
    frame.render_widget(Paragraph::new(stats), area);
}

/// Notice line. Renders nothing when there is no notice.
pub fn render_notice(state: &TuiState, frame: &mut Frame, area: Rect) {
    let Some(notice) = &state.knowledge.notice else {
        return;
    };
    let line = match notice.kind {
        NoticeKind::Success => Line::from(Span::styled(
            format!(" ✓ {}", notice.text),
            Style::default().fg(Color::Green),
        )),
        NoticeKind::Error => Line::from(vec![
            Span::styled(format!(" ✗ {}", notice.text), Style::default().fg(Color::Red)),
            Span::styled("  (Esc to dismiss)", Style::default().fg(Color::DarkGray)),
        ]),
    };
    frame.render_widget(Paragraph::new(line), area);
}
