use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::OverlayUpdate;
use super::render_utils::{InputHint, OverlayConfig, render_overlay};
use crate::effects::UiEffect;
use crate::state::TuiState;

/// Confirmation before deleting every document.
#[derive(Debug, Clone, Default)]
pub struct ConfirmClearState;

impl ConfirmClearState {
    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16, tui: &TuiState) {
        let hints = [InputHint::new("y", "delete"), InputHint::new("n/Esc", "keep")];
        let layout = render_overlay(
            frame,
            area,
            input_y,
            &OverlayConfig {
                title: "Clear Knowledge Base",
                border_color: Color::Red,
                width: 54,
                height: 8,
                hints: &hints,
            },
        );
        let lines = vec![
            Line::from(Span::styled(
                "Delete every document from the knowledge base?",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("Currently: {}", tui.knowledge.stats_label()),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "This cannot be undone and clears the conversation.",
                Style::default().fg(Color::Red),
            )),
        ];
        let body = Rect::new(
            layout.body.x + 1,
            layout.body.y,
            layout.body.width.saturating_sub(2),
            layout.body.height,
        );
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), body);
    }

    pub fn handle_key(&mut self, _tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('y' | 'Y') if !ctrl => {
                OverlayUpdate::close().with_ui_effects(vec![UiEffect::ClearDatabase])
            }
            KeyCode::Char('n' | 'N') | KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Char('c') if ctrl => OverlayUpdate::close(),
            _ => OverlayUpdate::stay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use delia_core::api::Agent;
    use delia_core::config::Config;

    use super::*;
    use crate::overlays::OverlayTransition;

    #[test]
    fn test_only_y_confirms() {
        let tui = TuiState::new(Config::default(), Agent::Documents, None);
        let mut confirm = ConfirmClearState;

        let update = confirm.handle_key(&tui, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(matches!(update.transition, OverlayTransition::Stay));

        let update = confirm.handle_key(&tui, KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(matches!(update.transition, OverlayTransition::Close));
        assert!(update.effects.is_empty());

        let update =
            confirm.handle_key(&tui, KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE));
        assert!(matches!(update.effects.as_slice(), [UiEffect::ClearDatabase]));
    }
}
