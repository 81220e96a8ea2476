//! Transcript scrollbar with a fixed-size thumb.
//!
//! The thumb length depends only on content and viewport size, so it does not
//! change while scrolling, and it touches the bottom edge when following the
//! newest message.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

const THUMB_SYMBOL: &str = "█";
const TRACK_SYMBOL: &str = "│";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scrollbar {
    total_lines: usize,
    viewport_height: usize,
    /// Lines scrolled up from the bottom.
    offset_from_bottom: usize,
}

impl Scrollbar {
    pub fn new(total_lines: usize, viewport_height: usize, offset_from_bottom: usize) -> Self {
        Self {
            total_lines,
            viewport_height,
            offset_from_bottom,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.total_lines > self.viewport_height
    }

    fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.viewport_height)
    }

    /// `(thumb start, thumb length)` on a track `track_len` rows tall.
    fn thumb(&self, track_len: usize) -> Option<(usize, usize)> {
        let max_scroll = self.max_scroll();
        if !self.is_visible() || track_len == 0 || max_scroll == 0 {
            return None;
        }
        let viewport = self.viewport_height.min(track_len);
        let denom = (self.total_lines - 1 + viewport) as u64;
        let len = ((track_len as u64 * viewport as u64 + denom / 2) / denom) as usize;
        let len = len.clamp(1, track_len);

        let from_top = max_scroll - self.offset_from_bottom.min(max_scroll);
        let start = (from_top as u64 * (track_len - len) as u64 / max_scroll as u64) as usize;
        Some((start, len))
    }
}

impl Widget for Scrollbar {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some((start, len)) = self.thumb(usize::from(area.height)) else {
            return;
        };
        let x = area.x + area.width.saturating_sub(1);
        let style = Style::default().fg(Color::DarkGray);
        for (idx, y) in (area.y..area.y + area.height).enumerate() {
            let symbol = if (start..start + len).contains(&idx) {
                THUMB_SYMBOL
            } else {
                TRACK_SYMBOL
            };
            buf.set_string(x, y, symbol, style);
        }
    }
}
