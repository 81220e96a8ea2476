use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tokio_util::sync::CancellationToken;

use super::markdown::{MarkdownDocument, WrapOptions, render_repaired, wrap_styled_spans};
use super::reveal::Typewriter;
use super::style::{Style, StyledLine, StyledSpan};
use crate::common::sanitize_for_display;

static CELL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a transcript cell, used to address reveal ticks and
/// copy targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellId(pub u64);

impl CellId {
    pub fn new() -> Self {
        CellId(CELL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for CellId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

/// Copy feedback of one code block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodeBlockState {
    copied_until: Option<Instant>,
}

impl CodeBlockState {
    pub fn mark_copied(&mut self, now: Instant, window: Duration) {
        self.copied_until = Some(now + window);
    }

    pub fn is_copied(&self, now: Instant) -> bool {
        self.copied_until.is_some_and(|until| now < until)
    }

    pub fn has_pending_reset(&self) -> bool {
        self.copied_until.is_some()
    }

    /// Resets the flag once its window is over. Returns true if it changed.
    pub fn expire(&mut self, now: Instant) -> bool {
        if self.copied_until.is_some_and(|until| now >= until) {
            self.copied_until = None;
            return true;
        }
        false
    }
}

const COPY_LABEL: &str = "  [copy]";
const COPIED_LABEL: &str = "  ✓ copied";
const BODY_INDENT: &str = "  ";

/// Width left for the body of a cell drawn `width` columns wide.
fn body_width(width: usize) -> usize {
    width.saturating_sub(BODY_INDENT.len()).max(1)
}

/// Rendered Markdown keyed by what it was rendered from.
#[derive(Debug, Clone)]
struct RenderCache {
    width: usize,
    visible_len: usize,
    generation: u64,
    document: MarkdownDocument,
}

/// Display lines of one cell, with the rows that carry a copy affordance.
#[derive(Debug, Clone, Default)]
pub struct CellLines {
    pub lines: Vec<StyledLine>,
    /// `(line index, code block index)` pairs.
    pub copy_rows: Vec<(usize, usize)>,
}

/// One message in the transcript.
#[derive(Debug)]
pub struct MessageCell {
    id: CellId,
    role: Role,
    content: String,
    created_at: DateTime<Local>,
    /// Waiting for the backend; rendered as a loading indicator.
    pending: bool,
    typewriter: Typewriter,
    code_blocks: Vec<CodeBlockState>,
    cache: RefCell<Option<RenderCache>>,
}

impl MessageCell {
    fn with_role(role: Role, content: String, pending: bool) -> Self {
        Self {
            id: CellId::new(),
            role,
            content,
            created_at: Local::now(),
            pending,
            typewriter: Typewriter::default(),
            code_blocks: Vec::new(),
            cache: RefCell::new(None),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content.into(), false)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content.into(), false)
    }

    /// An assistant cell waiting for its answer.
    pub fn pending_assistant() -> Self {
        Self::with_role(Role::Assistant, String::new(), true)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content.into(), false)
    }

    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    /// Text currently on screen (a prefix of the content while revealing).
    pub fn visible_text(&self) -> &str {
        self.typewriter.visible(&self.content)
    }

    /// Replaces the content. Any running reveal is detached and its token
    /// returned for cancellation. Copy flags belong to the old text and go.
    pub fn set_content(&mut self, content: String) -> Option<CancellationToken> {
        self.content = content;
        self.pending = false;
        self.code_blocks.clear();
        self.cache.replace(None);
        self.typewriter.settle()
    }

    /// Starts a reveal from an empty buffer. Returns the generation the
    /// reveal task must report and the token of a superseded task.
    pub fn start_reveal(&mut self) -> (u64, Option<CancellationToken>) {
        self.typewriter.restart()
    }

    pub fn attach_reveal(
        &mut self,
        generation: u64,
        token: CancellationToken,
    ) -> Result<(), CancellationToken> {
        self.typewriter.attach(generation, token)
    }

    /// Applies one reveal tick. `None` when the tick is stale.
    pub fn advance_reveal(&mut self, generation: u64) -> Option<bool> {
        self.typewriter.advance(generation, &self.content)
    }

    /// Detaches the reveal task, if any, showing the full content.
    pub fn teardown(&mut self) -> Option<CancellationToken> {
        self.typewriter.settle()
    }

    pub fn code_block_state(&self, block: usize) -> CodeBlockState {
        self.code_blocks.get(block).copied().unwrap_or_default()
    }

    pub fn mark_copied(&mut self, block: usize, now: Instant, window: Duration) {
        if self.code_blocks.len() <= block {
            self.code_blocks.resize(block + 1, CodeBlockState::default());
        }
        self.code_blocks[block].mark_copied(now, window);
    }

    pub fn expire_copied(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for state in &mut self.code_blocks {
            changed |= state.expire(now);
        }
        changed
    }

    pub fn has_pending_copy_reset(&self) -> bool {
        self.code_blocks.iter().any(CodeBlockState::has_pending_reset)
    }

    /// Markdown of the visible text at `width`, cached per cell.
    pub fn document(&self, width: usize) -> MarkdownDocument {
        let visible = self.visible_text();
        let generation = self.typewriter.generation();
        if let Some(cache) = self.cache.borrow().as_ref()
            && cache.width == width
            && cache.visible_len == visible.len()
            && cache.generation == generation
        {
            return cache.document.clone();
        }

        let document = render_repaired(visible, width);
        self.cache.replace(Some(RenderCache {
            width,
            visible_len: visible.len(),
            generation,
            document: document.clone(),
        }));
        document
    }

    /// Code of block `block` as currently rendered in a cell `width` wide.
    pub fn code_block_text(&self, block: usize, width: usize) -> Option<String> {
        self.document(body_width(width))
            .code_blocks
            .into_iter()
            .nth(block)
            .map(|b| b.code)
    }

    pub fn code_block_count(&self, width: usize) -> usize {
        if self.role != Role::Assistant || self.pending {
            return 0;
        }
        self.document(body_width(width)).code_blocks.len()
    }

    fn header(&self) -> StyledLine {
        let (label, style) = match self.role {
            Role::User => ("You", Style::UserPrefix),
            Role::Assistant => ("DELIA", Style::AssistantPrefix),
            Role::System => ("System", Style::SystemPrefix),
        };
        StyledLine {
            spans: vec![
                StyledSpan::new(label, style),
                StyledSpan::new(
                    format!("  {}", self.created_at.format("%H:%M")),
                    Style::Timestamp,
                ),
            ],
        }
    }

    /// Renders the cell for `width` columns as of `now`.
    pub fn display_lines(&self, width: usize, now: Instant) -> CellLines {
        let mut out = CellLines::default();
        out.lines.push(self.header());

        match self.role {
            Role::Assistant if self.pending => {
                out.lines.push(StyledLine {
                    spans: vec![
                        StyledSpan::new(BODY_INDENT, Style::Plain),
                        StyledSpan::new("Thinking...", Style::Loading),
                    ],
                });
            }
            Role::Assistant => {
                let document = self.document(body_width(width));
                let base = out.lines.len();
                for line in document.lines {
                    let mut spans = vec![StyledSpan::new(BODY_INDENT, Style::Plain)];
                    spans.extend(line.spans);
                    out.lines.push(StyledLine { spans });
                }
                for (idx, block) in document.code_blocks.iter().enumerate() {
                    let row = base + block.header_line;
                    let (label, style) = if self.code_block_state(idx).is_copied(now) {
                        (COPIED_LABEL, Style::CopiedLabel)
                    } else {
                        (COPY_LABEL, Style::CopyLabel)
                    };
                    if let Some(line) = out.lines.get_mut(row) {
                        line.spans.push(StyledSpan::new(label, style));
                        out.copy_rows.push((row, idx));
                    }
                }
            }
            Role::User | Role::System => {
                let style = if self.role == Role::User {
                    Style::User
                } else {
                    Style::System
                };
                let text = sanitize_for_display(&self.content);
                let opts = WrapOptions::with_prefixes(
                    width,
                    vec![StyledSpan::new(BODY_INDENT, Style::Plain)],
                    vec![StyledSpan::new(BODY_INDENT, Style::Plain)],
                );
                out.lines
                    .extend(wrap_styled_spans(&[StyledSpan::new(text, style)], &opts));
            }
        }

        out.lines.push(StyledLine::empty());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(1500);
    const TWO_BLOCKS: &str = "First:\n\n```python\nprint(1)\n```\n\nSecond:\n\n```sh\nls\n```";

    #[test]
    fn test_cell_ids_are_unique() {
        assert_ne!(CellId::new(), CellId::new());
    }

    #[test]
    fn test_copy_flags_are_independent_and_expire() {
        let mut cell = MessageCell::assistant(TWO_BLOCKS);
        let t0 = Instant::now();
        cell.mark_copied(0, t0, WINDOW);

        assert!(cell.code_block_state(0).is_copied(t0));
        assert!(!cell.code_block_state(1).is_copied(t0));

        let later = t0 + WINDOW;
        assert!(!cell.code_block_state(0).is_copied(later));
        assert!(cell.expire_copied(later));
        assert!(!cell.has_pending_copy_reset());
    }

    #[test]
    fn test_copy_label_follows_flag() {
        let mut cell = MessageCell::assistant(TWO_BLOCKS);
        let now = Instant::now();
        cell.mark_copied(1, now, WINDOW);

        let rendered = cell.display_lines(80, now);
        assert_eq!(rendered.copy_rows.len(), 2);
        let (first_row, _) = rendered.copy_rows[0];
        let (second_row, second_block) = rendered.copy_rows[1];
        assert_eq!(second_block, 1);
        assert!(rendered.lines[first_row].text().ends_with(COPY_LABEL));
        assert!(rendered.lines[second_row].text().ends_with(COPIED_LABEL));
    }

    #[test]
    fn test_code_block_text_is_exact() {
        let cell = MessageCell::assistant("Answer: ```python\ndef f(): pass");
        assert_eq!(cell.code_block_count(80), 1);
        assert_eq!(cell.code_block_text(0, 80).as_deref(), Some("def f(): pass"));
    }

    #[test]
    fn test_set_content_drops_copy_flags_and_cancels_reveal() {
        let mut cell = MessageCell::assistant("Hi there");
        let (generation, _) = cell.start_reveal();
        let token = CancellationToken::new();
        assert!(cell.attach_reveal(generation, token.clone()).is_ok());
        cell.mark_copied(0, Instant::now(), WINDOW);

        let stale = cell.set_content("Bye".to_string());
        assert!(stale.is_some());
        assert!(!cell.has_pending_copy_reset());
        assert_eq!(cell.visible_text(), "Bye");
        assert_eq!(cell.advance_reveal(generation), None);
    }

    #[test]
    fn test_revealing_cell_renders_prefix() {
        let mut cell = MessageCell::assistant("Hi there");
        let (generation, _) = cell.start_reveal();
        cell.advance_reveal(generation);
        cell.advance_reveal(generation);

        let rendered = cell.display_lines(40, Instant::now());
        assert_eq!(rendered.lines[1].text(), "  Hi");
    }

    #[test]
    fn test_user_text_is_verbatim() {
        let cell = MessageCell::user("**not bold** `x`");
        let rendered = cell.display_lines(80, Instant::now());
        assert_eq!(rendered.lines[1].text(), "  **not bold** `x`");
        assert!(rendered.copy_rows.is_empty());
    }

    #[test]
    fn test_pending_cell_shows_loading() {
        let cell = MessageCell::pending_assistant();
        let rendered = cell.display_lines(80, Instant::now());
        assert!(
            rendered.lines[1]
                .spans
                .iter()
                .any(|s| s.style == Style::Loading)
        );
    }
}
