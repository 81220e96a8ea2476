//! Editable text with a grapheme-aware cursor.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Input text plus a cursor stored as a byte offset on a grapheme boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    cursor: usize,
}

impl TextBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_multiline(&self) -> bool {
        self.text.contains('\n')
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replaces the content and moves the cursor to the end.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.len();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Returns the content and leaves the buffer empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn insert_str(&mut self, text: &str) {
        // Pasted CRLF becomes plain newlines.
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        self.text.insert_str(self.cursor, &text);
        self.cursor += text.len();
    }

    pub fn insert_char(&mut self, ch: char) {
        self.text.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map(|(idx, _)| idx)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .graphemes(true)
            .next()
            .map(|g| self.cursor + g.len())
    }

    pub fn delete_prev(&mut self) {
        if let Some(start) = self.prev_boundary() {
            self.text.replace_range(start..self.cursor, "");
            self.cursor = start;
        }
    }

    pub fn delete_next(&mut self) {
        if let Some(end) = self.next_boundary() {
            self.text.replace_range(self.cursor..end, "");
        }
    }

    /// Deletes the word before the cursor, plus the whitespace after it.
    pub fn delete_prev_word(&mut self) {
        let before = &self.text[..self.cursor];
        let trimmed = before.trim_end();
        let start = trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map_or(0, |(idx, c)| idx + c.len_utf8());
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    pub fn move_left(&mut self) {
        if let Some(idx) = self.prev_boundary() {
            self.cursor = idx;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(idx) = self.next_boundary() {
            self.cursor = idx;
        }
    }

    /// Start of the current line.
    pub fn move_home(&mut self) {
        self.cursor = self.text[..self.cursor].rfind('\n').map_or(0, |idx| idx + 1);
    }

    /// End of the current line.
    pub fn move_end(&mut self) {
        self.cursor = self.text[self.cursor..]
            .find('\n')
            .map_or(self.text.len(), |idx| self.cursor + idx);
    }

    /// Cursor as (line, display column).
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.cursor];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
        (line, before[line_start..].width())
    }

    pub fn line_count(&self) -> usize {
        self.text.matches('\n').count() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_take() {
        let mut buffer = TextBuffer::default();
        buffer.insert_str("hello");
        buffer.insert_char('!');
        assert_eq!(buffer.text(), "hello!");
        assert_eq!(buffer.take(), "hello!");
        assert!(buffer.is_empty());
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn test_delete_respects_graphemes() {
        let mut buffer = TextBuffer::default();
        buffer.insert_str("ae\u{301}");
        buffer.delete_prev();
        assert_eq!(buffer.text(), "a");
        buffer.move_left();
        buffer.delete_next();
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_cursor_movement_and_mid_insert() {
        let mut buffer = TextBuffer::default();
        buffer.insert_str("hllo");
        buffer.move_home();
        buffer.move_right();
        buffer.insert_char('e');
        assert_eq!(buffer.text(), "hello");
        buffer.move_end();
        assert_eq!(buffer.cursor(), 5);
    }

    #[test]
    fn test_delete_prev_word() {
        let mut buffer = TextBuffer::default();
        buffer.insert_str("upload my file  ");
        buffer.delete_prev_word();
        assert_eq!(buffer.text(), "upload my ");
    }

    #[test]
    fn test_multiline_cursor_position() {
        let mut buffer = TextBuffer::default();
        buffer.insert_str("one\r\ntwo");
        assert!(buffer.is_multiline());
        assert_eq!(buffer.line_count(), 2);
        assert_eq!(buffer.cursor_position(), (1, 3));
        buffer.move_home();
        assert_eq!(buffer.cursor_position(), (1, 0));
    }
}
