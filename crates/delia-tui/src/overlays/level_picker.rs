use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use delia_core::api::UserLevel;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState};

use super::OverlayUpdate;
use crate::effects::UiEffect;
use crate::mutations::{SessionMutation, StateMutation, TranscriptMutation};
use crate::state::TuiState;

#[derive(Debug, Clone)]
pub struct LevelPickerState {
    pub selected: usize,
}

impl LevelPickerState {
    pub fn open(current: UserLevel) -> Self {
        let selected = UserLevel::ALL
            .iter()
            .position(|l| *l == current)
            .unwrap_or(0);
        Self { selected }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16) {
        render_level_picker(frame, self, area, input_y);
    }

    pub fn handle_key(&mut self, _tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc | KeyCode::Char('c') if key.code == KeyCode::Esc || ctrl => {
                OverlayUpdate::close()
            }
            KeyCode::Up => {
                self.selected = self.selected.saturating_sub(1);
                OverlayUpdate::stay()
            }
            KeyCode::Down => {
                if self.selected < UserLevel::ALL.len() - 1 {
                    self.selected += 1;
                }
                OverlayUpdate::stay()
            }
            KeyCode::Enter => {
                let Some(&level) = UserLevel::ALL.get(self.selected) else {
                    return OverlayUpdate::close();
                };
                select_level(level)
            }
            _ => OverlayUpdate::stay(),
        }
    }
}

/// Applies `level` to the session, persists it and confirms in the transcript.
pub fn select_level(level: UserLevel) -> OverlayUpdate {
    OverlayUpdate::close()
        .with_ui_effects(vec![UiEffect::PersistUserLevel { level }])
        .with_mutations(vec![
            StateMutation::Session(SessionMutation::SetUserLevel(level)),
            StateMutation::Transcript(TranscriptMutation::AppendSystemMessage(format!(
                "EDSL level set to {}",
                level.label()
            ))),
        ])
}

fn render_level_picker(frame: &mut Frame, picker: &LevelPickerState, area: Rect, input_top_y: u16) {
    use super::render_utils::{InputHint, OverlayConfig, render_overlay, render_separator};

    let picker_height = u16::try_from(UserLevel::ALL.len()).unwrap_or(3) + 5;
    let hints = [
        InputHint::new("↑↓", "navigate"),
        InputHint::new("Enter", "select"),
        InputHint::new("Esc", "cancel"),
    ];
    let layout = render_overlay(
        frame,
        area,
        input_top_y,
        &OverlayConfig {
            title: "EDSL Level",
            border_color: Color::Magenta,
            width: 60,
            height: picker_height,
            hints: &hints,
        },
    );

    let list_height = layout.body.height.saturating_sub(1);
    let list_area = Rect::new(layout.body.x, layout.body.y, layout.body.width, list_height);

    let name_width = 14;
    let items: Vec<ListItem> = UserLevel::ALL
        .iter()
        .map(|level| {
            let desc_width = usize::from(layout.body.width).saturating_sub(2 + name_width + 1);
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<name_width$}", level.label()),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:>desc_width$}", level.description()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut list_state = ListState::default();
    list_state.select(Some(picker.selected));
    frame.render_stateful_widget(list, list_area, &mut list_state);

    render_separator(frame, layout.body, list_height);
}

#[cfg(test)]
mod tests {
    use delia_core::api::Agent;
    use delia_core::config::Config;

    use super::*;
    use crate::overlays::OverlayTransition;

    #[test]
    fn test_open_selects_current_level() {
        assert_eq!(LevelPickerState::open(UserLevel::Advanced).selected, 2);
    }

    #[test]
    fn test_enter_selects_and_persists() {
        let tui = TuiState::new(Config::default(), Agent::Edsl, None);
        let mut picker = LevelPickerState::open(UserLevel::Basic);
        picker.handle_key(&tui, KeyEvent::new(KeyCode::Down, KeyModifiers::NONE));
        let update = picker.handle_key(&tui, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        assert!(matches!(update.transition, OverlayTransition::Close));
        assert!(matches!(
            update.effects.as_slice(),
            [UiEffect::PersistUserLevel {
                level: UserLevel::Intermediate
            }]
        ));
        assert!(matches!(
            update.mutations.first(),
            Some(StateMutation::Session(SessionMutation::SetUserLevel(
                UserLevel::Intermediate
            )))
        ));
    }
}
