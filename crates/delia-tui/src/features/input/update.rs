//! Input key handling.
//!
//! Editing keys change the buffer in place; Enter hands the text to the
//! reducer as [`InputAction::Submit`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::state::InputState;
use crate::common::sanitize_for_display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    None,
    Submit(String),
}

struct Modifiers {
    ctrl: bool,
    shift: bool,
    alt: bool,
}

impl Modifiers {
    fn from(key: &KeyEvent) -> Self {
        Self {
            ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
            shift: key.modifiers.contains(KeyModifiers::SHIFT),
            alt: key.modifiers.contains(KeyModifiers::ALT),
        }
    }

    fn none(&self) -> bool {
        !self.ctrl && !self.shift && !self.alt
    }

    fn only_ctrl(&self) -> bool {
        self.ctrl && !self.shift && !self.alt
    }
}

/// Handles a key press on the main input. `enabled` is false while a chat
/// request is in flight: the text can still be edited but not sent.
pub fn handle_key(input: &mut InputState, key: KeyEvent, enabled: bool) -> InputAction {
    let mods = Modifiers::from(&key);
    handle_submission(input, key.code, &mods, enabled)
        .or_else(|| handle_history(input, key.code, &mods))
        .unwrap_or_else(|| {
            handle_editing(input, key.code, &mods);
            InputAction::None
        })
}

pub fn handle_paste(input: &mut InputState, text: &str) {
    input.buffer.insert_str(&sanitize_for_display(text));
    input.reset_navigation();
}

fn handle_submission(
    input: &mut InputState,
    code: KeyCode,
    mods: &Modifiers,
    enabled: bool,
) -> Option<InputAction> {
    if code != KeyCode::Enter {
        return None;
    }
    if mods.shift || mods.alt {
        input.buffer.insert_char('\n');
        return Some(InputAction::None);
    }
    if !enabled || input.text().trim().is_empty() {
        return Some(InputAction::None);
    }
    Some(InputAction::Submit(input.submit()))
}

fn handle_history(input: &mut InputState, code: KeyCode, mods: &Modifiers) -> Option<InputAction> {
    if !mods.none() {
        return None;
    }
    match code {
        KeyCode::Up if input.should_navigate_up() => {
            input.navigate_up();
            Some(InputAction::None)
        }
        KeyCode::Down if input.should_navigate_down() => {
            input.navigate_down();
            Some(InputAction::None)
        }
        _ => None,
    }
}

fn handle_editing(input: &mut InputState, code: KeyCode, mods: &Modifiers) {
    let buffer = &mut input.buffer;
    match code {
        KeyCode::Char('a') if mods.only_ctrl() => buffer.move_home(),
        KeyCode::Char('e') if mods.only_ctrl() => buffer.move_end(),
        KeyCode::Char('u') if mods.only_ctrl() => buffer.clear(),
        KeyCode::Char('w') if mods.only_ctrl() => buffer.delete_prev_word(),
        KeyCode::Backspace if mods.alt || mods.ctrl => buffer.delete_prev_word(),
        KeyCode::Char('j') if mods.only_ctrl() => buffer.insert_char('\n'),
        KeyCode::Char(ch) if !mods.ctrl => buffer.insert_char(ch),
        KeyCode::Backspace => buffer.delete_prev(),
        KeyCode::Delete => buffer.delete_next(),
        KeyCode::Left => buffer.move_left(),
        KeyCode::Right => buffer.move_right(),
        KeyCode::Home => buffer.move_home(),
        KeyCode::End => buffer.move_end(),
        KeyCode::Tab => buffer.insert_str("    "),
        _ => return,
    }
    input.reset_navigation();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(input: &mut InputState, text: &str) {
        for ch in text.chars() {
            handle_key(input, key(KeyCode::Char(ch)), true);
        }
    }

    #[test]
    fn test_enter_submits_text() {
        let mut input = InputState::default();
        type_text(&mut input, "hello");
        assert_eq!(
            handle_key(&mut input, key(KeyCode::Enter), true),
            InputAction::Submit("hello".to_string())
        );
        assert!(input.text().is_empty());
    }

    #[test]
    fn test_enter_does_nothing_when_disabled_or_blank() {
        let mut input = InputState::default();
        type_text(&mut input, "   ");
        assert_eq!(handle_key(&mut input, key(KeyCode::Enter), true), InputAction::None);

        input.clear();
        type_text(&mut input, "wait");
        assert_eq!(handle_key(&mut input, key(KeyCode::Enter), false), InputAction::None);
        assert_eq!(input.text(), "wait");
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut input = InputState::default();
        type_text(&mut input, "a");
        handle_key(&mut input, KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT), true);
        type_text(&mut input, "b");
        assert_eq!(input.text(), "a\nb");
    }

    #[test]
    fn test_paste_is_sanitized() {
        let mut input = InputState::default();
        handle_paste(&mut input, "x\ty\x1b");
        assert_eq!(input.text(), "x    y");
    }
}
