use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::features::transcript::{Style, StyledLine, StyledSpan};

/// Options for wrapping styled spans with hanging indents.
#[derive(Debug, Clone, Default)]
pub struct WrapOptions {
    /// Maximum display width for lines, prefixes included.
    pub width: usize,
    /// Prefix spans for the first line (e.g. "• " for a list bullet).
    pub first_prefix: Vec<StyledSpan>,
    /// Prefix spans for continuation lines.
    pub rest_prefix: Vec<StyledSpan>,
}

impl WrapOptions {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            first_prefix: vec![],
            rest_prefix: vec![],
        }
    }

    pub fn with_prefixes(
        width: usize,
        first_prefix: Vec<StyledSpan>,
        rest_prefix: Vec<StyledSpan>,
    ) -> Self {
        Self {
            width,
            first_prefix,
            rest_prefix,
        }
    }
}

fn prefix_width(prefix: &[StyledSpan]) -> usize {
    prefix.iter().map(|s| s.text.width()).sum()
}

/// Code keeps its whitespace and breaks by character; prose breaks on words.
fn preserves_whitespace(style: Style) -> bool {
    matches!(
        style,
        Style::CodeInline | Style::CodeBlock | Style::Syntax(_)
    )
}

/// Accumulates wrapped lines.
struct LineBuilder<'a> {
    opts: &'a WrapOptions,
    lines: Vec<StyledLine>,
    current: Vec<StyledSpan>,
    used: usize,
    /// Collapsed whitespace waiting to be emitted before the next atom.
    pending_space: Option<Style>,
    first_width: usize,
    rest_width: usize,
}

impl<'a> LineBuilder<'a> {
    fn new(opts: &'a WrapOptions) -> Self {
        Self {
            opts,
            lines: Vec::new(),
            current: Vec::new(),
            used: 0,
            pending_space: None,
            first_width: opts.width.saturating_sub(prefix_width(&opts.first_prefix)).max(1),
            rest_width: opts.width.saturating_sub(prefix_width(&opts.rest_prefix)).max(1),
        }
    }

    fn avail(&self) -> usize {
        if self.lines.is_empty() {
            self.first_width
        } else {
            self.rest_width
        }
    }

    fn break_line(&mut self) {
        let prefix = if self.lines.is_empty() {
            &self.opts.first_prefix
        } else {
            &self.opts.rest_prefix
        };
        let mut spans = prefix.clone();
        spans.append(&mut self.current);
        self.lines.push(StyledLine { spans });
        self.used = 0;
        self.pending_space = None;
    }

    /// Appends text to the current line, merging with a same-styled neighbour.
    fn emit(&mut self, text: &str, style: Style) {
        if text.is_empty() {
            return;
        }
        self.used += text.width();
        match self.current.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.current.push(StyledSpan {
                text: text.to_string(),
                style,
            }),
        }
    }

    fn mark_space(&mut self, style: Style) {
        if self.used > 0 {
            self.pending_space = Some(style);
        }
    }

    /// Places an unbreakable-if-possible atom (a word or a code run).
    fn place(&mut self, atom: &str, style: Style) {
        let width = atom.width();
        let space = usize::from(self.pending_space.is_some());

        if self.used + space + width <= self.avail() {
            if let Some(space_style) = self.pending_space.take() {
                self.emit(" ", space_style);
            }
            self.emit(atom, style);
            return;
        }

        if self.used > 0 {
            self.break_line();
        }
        if width <= self.avail() {
            self.emit(atom, style);
            return;
        }
        self.place_by_chars(atom, style);
    }

    fn place_by_chars(&mut self, atom: &str, style: Style) {
        let mut chunk = String::new();
        let mut chunk_width = 0;
        for ch in atom.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if ch_width > 0 && self.used + chunk_width + ch_width > self.avail() {
                if chunk.is_empty() && self.used > 0 {
                    self.break_line();
                } else if !chunk.is_empty() {
                    self.emit(&std::mem::take(&mut chunk), style);
                    chunk_width = 0;
                    self.break_line();
                }
            }
            chunk.push(ch);
            chunk_width += ch_width;
        }
        self.emit(&chunk, style);
    }

    fn push_prose(&mut self, text: &str, style: Style) {
        if text.starts_with(char::is_whitespace) {
            self.mark_space(style);
        }
        let mut words = text.split_whitespace().peekable();
        while let Some(word) = words.next() {
            self.place(word, style);
            if words.peek().is_some() {
                self.mark_space(style);
            }
        }
        if text.ends_with(char::is_whitespace) {
            self.mark_space(style);
        }
    }

    fn finish(mut self) -> Vec<StyledLine> {
        if !self.current.is_empty() || self.lines.is_empty() {
            self.break_line();
        }
        self.lines
    }
}

/// Wraps styled spans to the given width, keeping styles across breaks.
///
/// Prose wraps on word boundaries with whitespace collapsed; code styles keep
/// their whitespace. Embedded newlines force a break. Words wider than a line
/// are split by display width.
pub fn wrap_styled_spans(spans: &[StyledSpan], opts: &WrapOptions) -> Vec<StyledLine> {
    if opts.width == 0 {
        let mut all = opts.first_prefix.clone();
        all.extend(spans.iter().cloned());
        return vec![StyledLine { spans: all }];
    }

    let mut builder = LineBuilder::new(opts);
    for span in spans {
        for (idx, part) in span.text.split('\n').enumerate() {
            if idx > 0 {
                builder.break_line();
            }
            if part.is_empty() {
                continue;
            }
            if preserves_whitespace(span.style) {
                builder.place(part, span.style);
            } else {
                builder.push_prose(part, span.style);
            }
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, style: Style) -> StyledSpan {
        StyledSpan {
            text: text.to_string(),
            style,
        }
    }

    fn line_text(line: &StyledLine) -> String {
        line.spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_short_text_is_one_line() {
        let lines = wrap_styled_spans(&[span("hello world", Style::Assistant)], &WrapOptions::new(20));
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "hello world");
        assert!(lines[0].spans.iter().all(|s| s.style == Style::Assistant));
    }

    #[test]
    fn test_wraps_on_word_boundary() {
        let lines = wrap_styled_spans(&[span("hello world", Style::Assistant)], &WrapOptions::new(8));
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[0]), "hello");
        assert_eq!(line_text(&lines[1]), "world");
    }

    #[test]
    fn test_style_survives_break() {
        let spans = [span("hello ", Style::Assistant), span("world", Style::Strong)];
        let lines = wrap_styled_spans(&spans, &WrapOptions::new(8));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1].spans[0].style, Style::Strong);
    }

    #[test]
    fn test_inline_code_keeps_whitespace() {
        let spans = [
            span("word ", Style::Assistant),
            span("foo  bar", Style::CodeInline),
            span(" word", Style::Assistant),
        ];
        let lines = wrap_styled_spans(&spans, &WrapOptions::new(40));
        assert_eq!(line_text(&lines[0]), "word foo  bar word");
    }

    #[test]
    fn test_newline_forces_break() {
        let lines = wrap_styled_spans(&[span("line1\nline2", Style::Assistant)], &WrapOptions::new(20));
        assert_eq!(lines.len(), 2);
        assert_eq!(line_text(&lines[1]), "line2");
    }

    #[test]
    fn test_long_word_is_split() {
        let lines = wrap_styled_spans(&[span("abcdefghij", Style::Assistant)], &WrapOptions::new(4));
        let texts: Vec<String> = lines.iter().map(line_text).collect();
        assert_eq!(texts, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_hanging_indent() {
        let opts = WrapOptions::with_prefixes(
            12,
            vec![span("• ", Style::ListBullet)],
            vec![span("  ", Style::Plain)],
        );
        let lines = wrap_styled_spans(&[span("one two three four", Style::ListItem)], &opts);
        assert!(lines.len() > 1);
        assert_eq!(lines[0].spans[0].text, "• ");
        assert_eq!(lines[1].spans[0].text, "  ");
        for line in &lines {
            assert!(line_text(line).width() <= 12);
        }
    }

    #[test]
    fn test_empty_input_keeps_prefix_line() {
        let opts = WrapOptions::with_prefixes(10, vec![span("> ", Style::BlockQuote)], vec![]);
        let lines = wrap_styled_spans(&[], &opts);
        assert_eq!(lines.len(), 1);
        assert_eq!(line_text(&lines[0]), "> ");
    }
}
