//! Overlay modules for the TUI.
//!
//! Overlays are modal UI components that temporarily take over keyboard input.
//! Each overlay is self-contained: it owns its state, key handler, and render function.
//!
//! - `login.rs`: username/password form
//! - `level_picker.rs`: EDSL user level selection
//! - `confirm_clear.rs`: confirmation before clearing the knowledge base
//! - `render_utils.rs`: shared rendering utilities for overlays

pub mod confirm_clear;
pub mod level_picker;
pub mod login;
pub mod render_utils;

pub use confirm_clear::ConfirmClearState;
use crossterm::event::KeyEvent;
pub use level_picker::LevelPickerState;
pub use login::LoginState;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::effects::UiEffect;
use crate::mutations::StateMutation;
use crate::state::TuiState;

// ============================================================================
// OverlayRequest / OverlayTransition / OverlayUpdate
// ============================================================================

/// Requests to open a new overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayRequest {
    Login,
    LevelPicker,
    ConfirmClear,
}

/// Transition returned by overlay key handlers.
#[derive(Debug)]
pub enum OverlayTransition {
    Stay,
    Close,
}

/// Update returned by overlay key handlers.
#[derive(Debug)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub mutations: Vec<StateMutation>,
    pub effects: Vec<UiEffect>,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self {
            transition,
            mutations: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }

    #[must_use]
    pub fn with_mutations(mut self, mutations: Vec<StateMutation>) -> Self {
        self.mutations = mutations;
        self
    }

    #[must_use]
    pub fn with_ui_effects(mut self, effects: Vec<UiEffect>) -> Self {
        self.effects = effects;
        self
    }
}

// ============================================================================
// Overlay
// ============================================================================

#[derive(Debug)]
pub enum Overlay {
    Login(LoginState),
    LevelPicker(LevelPickerState),
    ConfirmClear(ConfirmClearState),
}

impl Overlay {
    pub fn open(request: OverlayRequest, tui: &TuiState) -> Self {
        match request {
            OverlayRequest::Login => Overlay::Login(LoginState::new(None)),
            OverlayRequest::LevelPicker => Overlay::LevelPicker(LevelPickerState::open(tui.level)),
            OverlayRequest::ConfirmClear => Overlay::ConfirmClear(ConfirmClearState),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16, tui: &TuiState) {
        match self {
            Overlay::Login(l) => l.render(frame, area, input_y),
            Overlay::LevelPicker(p) => p.render(frame, area, input_y),
            Overlay::ConfirmClear(c) => c.render(frame, area, input_y, tui),
        }
    }

    pub fn handle_key(&mut self, tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::Login(l) => l.handle_key(tui, key),
            Overlay::LevelPicker(p) => p.handle_key(tui, key),
            Overlay::ConfirmClear(c) => c.handle_key(tui, key),
        }
    }

    pub fn as_login_mut(&mut self) -> Option<&mut LoginState> {
        match self {
            Overlay::Login(l) => Some(l),
            _ => None,
        }
    }
}

// ============================================================================
// OverlayExt - Extension trait for Option<Overlay>
// ============================================================================

/// Extension trait for `Option<Overlay>` providing convenience render helpers.
pub trait OverlayExt {
    /// Renders the overlay if one is active.
    fn render(&self, frame: &mut Frame, area: Rect, input_y: u16, tui: &TuiState);
}

impl OverlayExt for Option<Overlay> {
    fn render(&self, frame: &mut Frame, area: Rect, input_y: u16, tui: &TuiState) {
        if let Some(overlay) = self {
            overlay.render(frame, area, input_y, tui);
        }
    }
}

/// Routes a key to the active overlay. Returns `None` when no overlay is open.
pub fn handle_overlay_key(
    tui: &TuiState,
    overlay: &mut Option<Overlay>,
    key: KeyEvent,
) -> Option<OverlayUpdate> {
    overlay.as_mut().map(|o| o.handle_key(tui, key))
}

#[cfg(test)]
mod tests {
    use delia_core::api::{Agent, UserLevel};
    use delia_core::config::Config;

    use super::*;

    #[test]
    fn test_open_level_picker_uses_session_level() {
        let mut tui = TuiState::new(Config::default(), Agent::Edsl, None);
        tui.level = UserLevel::Intermediate;
        let overlay = Overlay::open(OverlayRequest::LevelPicker, &tui);
        assert!(matches!(overlay, Overlay::LevelPicker(LevelPickerState { selected: 1 })));
    }

    #[test]
    fn test_no_overlay_means_no_update() {
        let tui = TuiState::new(Config::default(), Agent::Documents, None);
        let mut overlay = None;
        let key = KeyEvent::from(crossterm::event::KeyCode::Enter);
        assert!(handle_overlay_key(&tui, &mut overlay, key).is_none());
    }
}
