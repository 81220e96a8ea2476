//! Chat input state: text buffer and sent-message history.

use super::TextBuffer;

#[derive(Debug, Default)]
pub struct InputState {
    pub buffer: TextBuffer,
    /// Sent messages, oldest first, for ↑/↓ recall.
    pub history: Vec<String>,
    /// Position while browsing history (None = editing a draft).
    pub history_index: Option<usize>,
    /// Draft saved when browsing starts.
    draft: Option<String>,
}

impl InputState {
    pub fn text(&self) -> &str {
        self.buffer.text()
    }

    pub fn set_text(&mut self, text: &str) {
        self.buffer.set_text(text);
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.reset_navigation();
    }

    /// Takes the buffer for sending and records it in history.
    pub fn submit(&mut self) -> String {
        let text = self.buffer.take();
        self.reset_navigation();
        if !text.trim().is_empty() && self.history.last() != Some(&text) {
            self.history.push(text.clone());
        }
        text
    }

    pub fn reset_navigation(&mut self) {
        self.history_index = None;
        self.draft = None;
    }

    /// ↑ browses history only from a single-line buffer or while browsing.
    pub fn should_navigate_up(&self) -> bool {
        !self.history.is_empty() && (self.history_index.is_some() || !self.buffer.is_multiline())
    }

    pub fn should_navigate_down(&self) -> bool {
        self.history_index.is_some()
    }

    pub fn navigate_up(&mut self) {
        let idx = match self.history_index {
            None => {
                self.draft = Some(self.buffer.text().to_string());
                self.history.len().saturating_sub(1)
            }
            Some(idx) => idx.saturating_sub(1),
        };
        if let Some(entry) = self.history.get(idx) {
            self.history_index = Some(idx);
            self.buffer.set_text(entry);
        }
    }

    pub fn navigate_down(&mut self) {
        let Some(idx) = self.history_index else {
            return;
        };
        if let Some(entry) = self.history.get(idx + 1) {
            self.history_index = Some(idx + 1);
            self.buffer.set_text(entry);
        } else {
            let draft = self.draft.take().unwrap_or_default();
            self.history_index = None;
            self.buffer.set_text(&draft);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_records_history_once() {
        let mut input = InputState::default();
        input.set_text("hi");
        assert_eq!(input.submit(), "hi");
        input.set_text("hi");
        input.submit();
        assert_eq!(input.history, vec!["hi".to_string()]);
        assert!(input.text().is_empty());
    }

    #[test]
    fn test_history_navigation_restores_draft() {
        let mut input = InputState::default();
        for text in ["first", "second"] {
            input.set_text(text);
            input.submit();
        }
        input.set_text("draft");

        input.navigate_up();
        assert_eq!(input.text(), "second");
        input.navigate_up();
        assert_eq!(input.text(), "first");
        input.navigate_up();
        assert_eq!(input.text(), "first");

        input.navigate_down();
        assert_eq!(input.text(), "second");
        input.navigate_down();
        assert_eq!(input.text(), "draft");
        assert!(!input.should_navigate_down());
    }
}
