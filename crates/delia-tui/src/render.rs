//! Pure view/render functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui Frame and never return
//! effects. The only state they touch is render feedback held in `Cell`s
//! (transcript area, copy targets).

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::common::TaskMeta;
use crate::overlays::OverlayExt;
use crate::state::{AppState, TuiState};
use crate::{input, knowledge, transcript};

/// Header bar height.
const HEADER_HEIGHT: u16 = 1;

/// Notice line height, when something is shown.
const NOTICE_HEIGHT: u16 = 1;

/// Transcript horizontal margin (padding on each side).
pub const TRANSCRIPT_MARGIN: u16 = 1;

/// Width reserved for the scrollbar on the right side.
const SCROLLBAR_WIDTH: u16 = 1;

/// Screen regions for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub header: Rect,
    /// Transcript column including margins and scrollbar.
    pub transcript_pane: Rect,
    /// Where transcript text goes.
    pub transcript: Rect,
    pub notice: Rect,
    pub input: Rect,
}

fn has_notice_line(state: &TuiState) -> bool {
    state.knowledge.notice.is_some() || state.tasks.upload.is_running()
}

/// Splits `area` into header, transcript, notice line and input.
///
/// Shared by the renderer and the reducer so the transcript viewport used for
/// scrolling matches what is drawn.
pub fn layout(state: &TuiState, area: Rect) -> AppLayout {
    let input_height = input::calculate_input_height(state, area.height);
    let notice_height = if has_notice_line(state) {
        NOTICE_HEIGHT
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(notice_height),
            Constraint::Length(input_height),
        ])
        .split(area);

    let pane = chunks[1];
    let transcript = Rect {
        x: pane.x + TRANSCRIPT_MARGIN,
        y: pane.y,
        width: pane
            .width
            .saturating_sub(TRANSCRIPT_MARGIN * 2 + SCROLLBAR_WIDTH),
        height: pane.height,
    };

    AppLayout {
        header: chunks[0],
        transcript_pane: pane,
        transcript,
        notice: chunks[2],
        input: chunks[3],
    }
}

/// Renders the entire TUI to the frame.
pub fn render(app: &AppState, frame: &mut Frame) {
    let state = &app.tui;
    let area = frame.area();
    let regions = layout(state, area);
    let now = Instant::now();

    knowledge::render_header(state, frame, regions.header);

    state.transcript_area.set(regions.transcript);
    let scrollbar = transcript::render_transcript(
        frame,
        regions.transcript,
        &state.transcript,
        state.agent,
        now,
    );
    frame.render_widget(scrollbar, regions.transcript_pane);

    if regions.notice.height > 0 {
        render_notice_line(state, frame, regions.notice);
    }

    input::render_input(state, frame, regions.input, app.overlay.is_none());

    // Overlay last so it draws on top.
    app.overlay.render(frame, area, regions.input.y, state);
}

/// Upload progress wins over notices; a finished upload reports through one.
fn render_notice_line(state: &TuiState, frame: &mut Frame, area: Rect) {
    if let TaskMeta::Upload { file } = &state.tasks.upload.meta {
        let line = Line::from(vec![
            Span::raw(" "),
            Span::styled(
                format!("Uploading {file}..."),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }
    knowledge::render_notice(state, frame, area);
}

#[cfg(test)]
mod tests {
    use delia_core::api::Agent;
    use delia_core::config::Config;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::knowledge::Notice;

    fn app() -> AppState {
        AppState::new(Config::default(), Agent::Documents, Some("token".into()))
    }

    #[test]
    fn test_layout_reserves_notice_line_only_when_needed() {
        let mut app = app();
        let area = Rect::new(0, 0, 80, 24);
        let quiet = layout(&app.tui, area);
        assert_eq!(quiet.notice.height, 0);
        assert_eq!(quiet.header.height, 1);
        assert_eq!(quiet.transcript.width, 80 - 3);

        app.tui.knowledge.show(Notice::error("boom"));
        let noisy = layout(&app.tui, area);
        assert_eq!(noisy.notice.height, 1);
        assert_eq!(noisy.transcript.height + 1, quiet.transcript.height);
    }

    #[test]
    fn test_render_records_transcript_area() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|frame| render(&app, frame)).unwrap();

        let expected = layout(&app.tui, Rect::new(0, 0, 60, 20)).transcript;
        assert_eq!(app.tui.transcript_area.get(), expected);
    }
}
