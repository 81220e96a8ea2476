use std::cell::{Cell, RefCell};
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use super::cell::{CellId, MessageCell};
use super::style::StyledLine;

/// A code block header visible on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyTarget {
    pub row: u16,
    pub cell: CellId,
    pub block: usize,
}

/// Transcript lines flattened across cells.
#[derive(Debug, Default)]
pub struct TranscriptLines {
    pub lines: Vec<StyledLine>,
    /// `(line index, cell, code block index)` for every copy affordance.
    pub copy_rows: Vec<(usize, CellId, usize)>,
}

/// Messages of the current conversation plus scroll position.
#[derive(Debug)]
pub struct TranscriptState {
    cells: Vec<MessageCell>,
    /// Lines scrolled up from the bottom. 0 follows the newest message.
    scroll_offset: usize,
    /// Content width of the transcript area, updated from frame events.
    width: usize,
    height: usize,
    /// Filled during render, read by mouse handling.
    copy_targets: RefCell<Vec<CopyTarget>>,
    max_scroll: Cell<usize>,
}

impl Default for TranscriptState {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptState {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            scroll_offset: 0,
            width: 80,
            height: 20,
            copy_targets: RefCell::new(Vec::new()),
            max_scroll: Cell::new(usize::MAX),
        }
    }

    pub fn cells(&self) -> &[MessageCell] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_viewport(&mut self, width: usize, height: usize) {
        self.width = width.max(1);
        self.height = height.max(1);
    }

    pub fn cell(&self, id: CellId) -> Option<&MessageCell> {
        self.cells.iter().find(|c| c.id() == id)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut MessageCell> {
        self.cells.iter_mut().find(|c| c.id() == id)
    }

    /// Appends a cell and jumps back to the bottom.
    pub fn push(&mut self, cell: MessageCell) -> CellId {
        let id = cell.id();
        self.cells.push(cell);
        self.scroll_offset = 0;
        id
    }

    /// Removes a cell, returning the token of its reveal task.
    pub fn remove(&mut self, id: CellId) -> Option<CancellationToken> {
        let idx = self.cells.iter().position(|c| c.id() == id)?;
        let mut cell = self.cells.remove(idx);
        cell.teardown()
    }

    /// Drops every cell, returning the reveal tokens to cancel.
    pub fn clear(&mut self) -> Vec<CancellationToken> {
        let tokens = self.teardown_all();
        self.cells.clear();
        self.scroll_offset = 0;
        self.copy_targets.borrow_mut().clear();
        tokens
    }

    /// Stops every running reveal, keeping the cells.
    pub fn teardown_all(&mut self) -> Vec<CancellationToken> {
        self.cells
            .iter_mut()
            .filter_map(MessageCell::teardown)
            .collect()
    }

    pub fn has_running_reveal(&self) -> bool {
        self.cells.iter().any(|c| c.typewriter().is_running())
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn scroll_up(&mut self, lines: usize) {
        let max = self.max_scroll.get();
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(max);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn page(&self) -> usize {
        self.height.saturating_sub(2).max(1)
    }

    /// Records how far the last render could scroll.
    pub fn set_max_scroll(&self, max: usize) {
        self.max_scroll.set(max);
    }

    pub fn set_copy_targets(&self, targets: Vec<CopyTarget>) {
        self.copy_targets.replace(targets);
    }

    pub fn copy_target_at(&self, row: u16) -> Option<CopyTarget> {
        self.copy_targets
            .borrow()
            .iter()
            .find(|t| t.row == row)
            .copied()
    }

    /// The last code block of the newest message that has one.
    pub fn latest_code_block(&self) -> Option<(CellId, usize)> {
        self.cells.iter().rev().find_map(|cell| {
            let count = cell.code_block_count(self.width);
            (count > 0).then(|| (cell.id(), count - 1))
        })
    }

    pub fn expire_copied(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for cell in &mut self.cells {
            changed |= cell.expire_copied(now);
        }
        changed
    }

    pub fn has_pending_copy_reset(&self) -> bool {
        self.cells.iter().any(MessageCell::has_pending_copy_reset)
    }

    /// All cells rendered at the current width.
    pub fn lines(&self, now: Instant) -> TranscriptLines {
        let mut out = TranscriptLines::default();
        for cell in &self.cells {
            let rendered = cell.display_lines(self.width, now);
            let base = out.lines.len();
            out.copy_rows.extend(
                rendered
                    .copy_rows
                    .into_iter()
                    .map(|(row, block)| (base + row, cell.id(), block)),
            );
            out.lines.extend(rendered.lines);
        }
        out
    }
}
