use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Calculates the area for an overlay, centered horizontally and vertically
/// within the available height (usually above the input bar).
pub fn calculate_overlay_area(area: Rect, available_height: u16, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(available_height.saturating_sub(2));

    let overlay_x = area.x + (area.width.saturating_sub(width)) / 2;
    let overlay_y = area.y + (available_height.saturating_sub(height)) / 2;
    Rect::new(overlay_x, overlay_y, width, height)
}

/// Renders the base container for an overlay (clears background, draws border and title).
pub fn render_overlay_container(frame: &mut Frame, area: Rect, title: &str, border_color: Color) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {title} "))
        .title_style(
            Style::default()
                .fg(border_color)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(block, area);
}

/// Input configuration for an overlay.
pub struct OverlayConfig<'a> {
    pub title: &'a str,
    pub border_color: Color,
    pub width: u16,
    pub height: u16,
    pub hints: &'a [InputHint<'a>],
}

/// Layout rectangles for an overlay.
pub struct OverlayLayout {
    pub body: Rect,
}

/// Render a standard overlay container and return its layout.
pub fn render_overlay(
    frame: &mut Frame,
    area: Rect,
    input_y: u16,
    config: &OverlayConfig<'_>,
) -> OverlayLayout {
    let popup = calculate_overlay_area(area, input_y, config.width, config.height);
    render_overlay_container(frame, popup, config.title, config.border_color);

    let inner = Rect::new(
        popup.x + 1,
        popup.y + 1,
        popup.width.saturating_sub(2),
        popup.height.saturating_sub(2),
    );

    if !config.hints.is_empty() {
        render_hints(frame, inner, config.hints, config.border_color);
    }

    let footer_height = u16::from(!config.hints.is_empty());
    let body = Rect::new(
        inner.x,
        inner.y,
        inner.width,
        inner.height.saturating_sub(footer_height),
    );

    OverlayLayout { body }
}

/// Helper struct for keyboard hints.
pub struct InputHint<'a> {
    pub key: &'a str,
    pub action: &'a str,
}

impl<'a> InputHint<'a> {
    pub fn new(key: &'a str, action: &'a str) -> Self {
        Self { key, action }
    }
}

/// A labelled single-line field: "Username: <text>█".
pub struct InputLine<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub focused: bool,
    pub accent: Color,
}

/// Keeps the end of `text` visible within `max_width` columns.
fn truncate_start(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let mut kept = Vec::new();
    let mut used = 1;
    for ch in text.chars().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > max_width {
            break;
        }
        kept.push(ch);
        used += w;
    }
    std::iter::once('…').chain(kept.into_iter().rev()).collect()
}

/// Renders a labelled input line. The block cursor is drawn only when focused.
pub fn render_input_line(frame: &mut Frame, area: Rect, input: &InputLine<'_>) {
    let label_width = input.label.width() + 1;
    let max_text = usize::from(area.width).saturating_sub(label_width + 1);

    let label_style = if input.focused {
        Style::default()
            .fg(input.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![
        Span::styled(format!("{} ", input.label), label_style),
        Span::styled(
            truncate_start(input.value, max_text),
            Style::default().fg(Color::White),
        ),
    ];
    if input.focused {
        spans.push(Span::styled("█", Style::default().fg(input.accent)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Renders a line of keyboard hints at the bottom of the overlay.
pub fn render_hints(frame: &mut Frame, area: Rect, hints: &[InputHint], highlight_color: Color) {
    let hints_y = area.y + area.height.saturating_sub(1);
    let hints_area = Rect::new(area.x, hints_y, area.width, 1);

    let mut spans = Vec::new();
    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" • ", Style::default().fg(Color::DarkGray)));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(highlight_color)));
        spans.push(Span::styled(
            format!(" {}", hint.action),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let para = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(para, hints_area);
}

/// Renders a separator line.
pub fn render_separator(frame: &mut Frame, area: Rect, y_offset: u16) {
    if y_offset >= area.height {
        return;
    }
    let separator = "─".repeat(usize::from(area.width));
    let separator_area = Rect::new(area.x, area.y + y_offset, area.width, 1);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        ))),
        separator_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_area_is_centered_and_clamped() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = calculate_overlay_area(area, 30, 50, 10);
        assert_eq!(popup, Rect::new(25, 10, 50, 10));

        let small = calculate_overlay_area(Rect::new(0, 0, 20, 8), 8, 50, 10);
        assert_eq!((small.width, small.height), (16, 6));
    }

    #[test]
    fn test_truncate_start_keeps_tail() {
        assert_eq!(truncate_start("short", 10), "short");
        assert_eq!(truncate_start("abcdefgh", 5), "…efgh");
    }
}
