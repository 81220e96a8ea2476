/// A styled span of text (UI-agnostic).
///
/// Converted to ratatui spans at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    pub style: Style,
}

impl StyledSpan {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// A line of styled spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine {
    pub spans: Vec<StyledSpan>,
}

impl StyledLine {
    pub fn empty() -> Self {
        StyledLine { spans: vec![] }
    }

    pub fn plain(text: impl Into<String>, style: Style) -> Self {
        StyledLine {
            spans: vec![StyledSpan::new(text, style)],
        }
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A 24-bit colour picked by the syntax highlighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Semantic style identifiers (UI-agnostic).
///
/// Translated to terminal styles by the renderer, which keeps the transcript
/// module free of terminal dependencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    /// No styling.
    Plain,
    /// Role label in front of a user message.
    UserPrefix,
    /// User message content.
    User,
    /// Role label in front of an assistant message.
    AssistantPrefix,
    /// Assistant message content.
    Assistant,
    /// System notice prefix.
    SystemPrefix,
    /// System notice content.
    System,
    /// Failure text.
    Error,
    /// Message timestamp (muted).
    Timestamp,
    /// "Thinking..." indicator while a request is in flight.
    Loading,

    // Markdown styles
    /// Inline code (`code`).
    CodeInline,
    /// Code block content without a known language.
    CodeBlock,
    /// Highlighted code token.
    Syntax(Rgb),
    /// Code block header and closing fence.
    CodeFence,
    /// Copy affordance on a code block header.
    CopyLabel,
    /// Copy affordance right after a copy.
    CopiedLabel,
    /// Emphasized text (*italic*).
    Emphasis,
    /// Strong text (**bold**).
    Strong,
    H1,
    H2,
    H3,
    H4,
    /// Heading level 5 and 6.
    MinorHeading,
    /// Link text.
    Link,
    /// Blockquote content.
    BlockQuote,
    /// List bullet marker.
    ListBullet,
    /// List number marker.
    ListNumber,
    /// List item text.
    ListItem,
    /// Horizontal rule and table borders.
    Rule,
}
