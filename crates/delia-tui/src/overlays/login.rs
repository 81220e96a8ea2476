use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::OverlayUpdate;
use super::render_utils::{InputHint, InputLine, OverlayConfig, render_input_line, render_overlay};
use crate::effects::UiEffect;
use crate::state::TuiState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

/// Username/password form.
#[derive(Debug, Clone)]
pub struct LoginState {
    pub username: String,
    password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    /// Credentials sent, waiting for the result.
    pub submitting: bool,
}

impl LoginState {
    pub fn new(error: Option<String>) -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            focus: LoginField::Username,
            error,
            submitting: false,
        }
    }

    /// Shows a failed attempt: the password is cleared and focused.
    pub fn fail(&mut self, error: String) {
        self.submitting = false;
        self.password.clear();
        self.focus = if self.username.is_empty() {
            LoginField::Username
        } else {
            LoginField::Password
        };
        self.error = Some(error);
    }

    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Username => &mut self.username,
            LoginField::Password => &mut self.password,
        }
    }

    fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, input_y: u16) {
        render_login(frame, self, area, input_y);
    }

    pub fn handle_key(&mut self, _tui: &TuiState, key: KeyEvent) -> OverlayUpdate {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return OverlayUpdate::stay().with_ui_effects(vec![UiEffect::Quit]);
        }
        if self.submitting {
            return match key.code {
                KeyCode::Esc => OverlayUpdate::close(),
                _ => OverlayUpdate::stay(),
            };
        }

        match key.code {
            KeyCode::Esc => OverlayUpdate::close(),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.toggle_focus();
                OverlayUpdate::stay()
            }
            KeyCode::Backspace => {
                self.field_mut().pop();
                OverlayUpdate::stay()
            }
            KeyCode::Char('u') if ctrl => {
                self.field_mut().clear();
                OverlayUpdate::stay()
            }
            KeyCode::Char(c) if !ctrl => {
                self.field_mut().push(c);
                OverlayUpdate::stay()
            }
            KeyCode::Enter => self.submit(),
            _ => OverlayUpdate::stay(),
        }
    }

    fn submit(&mut self) -> OverlayUpdate {
        let username = self.username.trim().to_string();
        if username.is_empty() {
            self.focus = LoginField::Username;
            return OverlayUpdate::stay();
        }
        if self.password.is_empty() {
            self.focus = LoginField::Password;
            return OverlayUpdate::stay();
        }
        self.submitting = true;
        self.error = None;
        OverlayUpdate::stay().with_ui_effects(vec![UiEffect::Login {
            username,
            password: self.password.clone(),
        }])
    }

    /// Pasted text goes into the focused field, without line breaks.
    pub fn paste(&mut self, text: &str) {
        if !self.submitting {
            self.field_mut()
                .extend(text.chars().filter(|c| !c.is_control()));
        }
    }
}

fn render_login(frame: &mut Frame, login: &LoginState, area: Rect, input_y: u16) {
    let hints = [
        InputHint::new("Tab", "switch field"),
        InputHint::new("Enter", "log in"),
        InputHint::new("Esc", "close"),
    ];
    let layout = render_overlay(
        frame,
        area,
        input_y,
        &OverlayConfig {
            title: "Log in to DELIA",
            border_color: Color::Cyan,
            width: 56,
            height: 10,
            hints: &hints,
        },
    );
    let body = layout.body;
    if body.height < 4 {
        return;
    }
    let row = |offset: u16| Rect::new(body.x + 1, body.y + offset, body.width.saturating_sub(2), 1);

    let masked = "•".repeat(login.password.chars().count());
    render_input_line(
        frame,
        row(1),
        &InputLine {
            label: "Username:",
            value: &login.username,
            focused: !login.submitting && login.focus == LoginField::Username,
            accent: Color::Cyan,
        },
    );
    render_input_line(
        frame,
        row(2),
        &InputLine {
            label: "Password:",
            value: &masked,
            focused: !login.submitting && login.focus == LoginField::Password,
            accent: Color::Cyan,
        },
    );

    let status = if login.submitting {
        Some(Span::styled("Logging in...", Style::default().fg(Color::Yellow)))
    } else {
        login
            .error
            .as_ref()
            .map(|e| Span::styled(e.clone(), Style::default().fg(Color::Red)))
    };
    if let Some(status) = status {
        frame.render_widget(Paragraph::new(Line::from(status)), row(4));
    }
}

#[cfg(test)]
mod tests {
    use delia_core::api::Agent;
    use delia_core::config::Config;

    use super::*;
    use crate::overlays::OverlayTransition;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(login: &mut LoginState, tui: &TuiState, text: &str) {
        for c in text.chars() {
            login.handle_key(tui, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_enter_moves_to_password_then_submits() {
        let tui = TuiState::new(Config::default(), Agent::Documents, None);
        let mut login = LoginState::new(None);
        type_text(&mut login, &tui, "ana");

        let update = login.handle_key(&tui, key(KeyCode::Enter));
        assert!(update.effects.is_empty());
        assert_eq!(login.focus, LoginField::Password);

        type_text(&mut login, &tui, "secret");
        let update = login.handle_key(&tui, key(KeyCode::Enter));
        assert!(matches!(update.transition, OverlayTransition::Stay));
        assert!(matches!(
            update.effects.as_slice(),
            [UiEffect::Login { username, password }] if username == "ana" && password == "secret"
        ));
        assert!(login.submitting);
    }

    #[test]
    fn test_failure_clears_password() {
        let mut login = LoginState::new(None);
        login.username = "ana".into();
        login.password = "wrong".into();
        login.submitting = true;

        login.fail("Incorrect username or password".into());
        assert!(!login.submitting);
        assert!(login.password.is_empty());
        assert_eq!(login.focus, LoginField::Password);
        assert!(login.error.is_some());
    }
}
