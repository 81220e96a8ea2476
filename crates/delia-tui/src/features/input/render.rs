//! Input feature view.
//!
//! Pure rendering functions for the input area.

use delia_core::api::Agent;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use unicode_width::UnicodeWidthChar;

use super::TextBuffer;
use crate::state::TuiState;

/// Minimum height of the input area (lines, including borders).
const INPUT_HEIGHT_MIN: u16 = 3;

/// Maximum height of the input area as a percentage of screen height.
const INPUT_HEIGHT_MAX_PERCENT: f32 = 0.4;

/// Result of wrapping the buffer with Unicode-aware cursor tracking.
struct WrappedText {
    lines: Vec<Line<'static>>,
    /// Visual row of the cursor (0-indexed, after wrapping).
    cursor_row: usize,
    /// Visual column of the cursor (display width units).
    cursor_col: usize,
}

/// Wraps buffer content character by character on display width.
fn wrap_buffer(buffer: &TextBuffer, available_width: usize) -> WrappedText {
    let available_width = available_width.max(1);
    let cursor = buffer.cursor();

    let mut lines = Vec::new();
    let mut cursor_row = 0;
    let mut cursor_col = 0;
    let mut line_start = 0;

    for logical in buffer.text().split('\n') {
        let mut current = String::new();
        let mut width = 0usize;

        for (offset, ch) in logical.char_indices() {
            let ch_width = ch.width().unwrap_or(0);
            if width + ch_width > available_width && width > 0 {
                lines.push(Line::from(std::mem::take(&mut current)));
                width = 0;
            }
            if line_start + offset == cursor {
                cursor_row = lines.len();
                cursor_col = width;
            }
            current.push(ch);
            width += ch_width;
        }
        if line_start + logical.len() == cursor {
            cursor_row = lines.len();
            cursor_col = width;
        }
        lines.push(Line::from(current));
        line_start += logical.len() + 1;
    }

    WrappedText {
        lines,
        cursor_row,
        cursor_col,
    }
}

/// Input height: grows with the number of lines up to 40% of the screen.
pub fn calculate_input_height(state: &TuiState, terminal_height: u16) -> u16 {
    let line_count = u16::try_from(state.input.buffer.line_count()).unwrap_or(u16::MAX);
    let max_height =
        ((f32::from(terminal_height) * INPUT_HEIGHT_MAX_PERCENT) as u16).max(INPUT_HEIGHT_MIN);
    line_count
        .saturating_add(2)
        .clamp(INPUT_HEIGHT_MIN, max_height)
}

/// Renders the input box. When `show_cursor` is false, the terminal cursor is
/// not placed (an overlay owns it).
pub fn render_input(state: &TuiState, frame: &mut Frame, area: Rect, show_cursor: bool) {
    let dim = Style::default().fg(Color::DarkGray);
    let busy = state.is_waiting();

    let mut title = vec![Span::styled(format!(" {}", state.agent.label()), dim)];
    if state.agent == Agent::Edsl {
        title.push(Span::styled(
            format!(" [{}]", state.level.label()),
            dim.add_modifier(Modifier::DIM),
        ));
    }
    title.push(Span::styled(" ", dim));

    let status = if busy {
        Span::styled(
            " waiting for DELIA... (Esc to cancel) ",
            Style::default().fg(Color::Yellow),
        )
    } else {
        Span::styled(" Enter send · Shift+Enter newline · /help ", dim)
    };

    let border_color = if busy { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(Line::from(title))
        .title_bottom(Line::from(status).alignment(Alignment::Right));

    let inner = block.inner(area);
    if inner.width == 0 || inner.height == 0 {
        frame.render_widget(block, area);
        return;
    }

    let wrapped = wrap_buffer(&state.input.buffer, usize::from(inner.width));
    let viewport = usize::from(inner.height);
    // Keep the cursor row on screen.
    let scroll = (wrapped.cursor_row + 1).saturating_sub(viewport);

    let visible: Vec<Line> = wrapped
        .lines
        .into_iter()
        .skip(scroll)
        .take(viewport)
        .collect();
    frame.render_widget(Paragraph::new(visible).block(block), area);

    let cursor_x = inner.x + u16::try_from(wrapped.cursor_col).unwrap_or(u16::MAX);
    let cursor_y =
        inner.y + u16::try_from(wrapped.cursor_row.saturating_sub(scroll)).unwrap_or(u16::MAX);
    if show_cursor && cursor_x < inner.x + inner.width && cursor_y < inner.y + inner.height {
        frame.set_cursor_position((cursor_x, cursor_y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> TextBuffer {
        let mut buffer = TextBuffer::default();
        buffer.insert_str(text);
        buffer
    }

    #[test]
    fn test_wrap_tracks_cursor_at_end() {
        let wrapped = wrap_buffer(&buffer("abcdef"), 4);
        assert_eq!(wrapped.lines.len(), 2);
        assert_eq!((wrapped.cursor_row, wrapped.cursor_col), (1, 2));
    }

    #[test]
    fn test_wrap_newlines_and_wide_chars() {
        let wrapped = wrap_buffer(&buffer("你好你\nx"), 4);
        assert_eq!(wrapped.lines.len(), 3);
        assert_eq!((wrapped.cursor_row, wrapped.cursor_col), (2, 1));
    }

    #[test]
    fn test_empty_buffer_has_one_line() {
        let wrapped = wrap_buffer(&TextBuffer::default(), 10);
        assert_eq!(wrapped.lines.len(), 1);
        assert_eq!((wrapped.cursor_row, wrapped.cursor_col), (0, 0));
    }
}
