//! UI event types.
//!
//! All external inputs (terminal, async results, reveal ticks) are converted
//! to `UiEvent` before being processed by the reducer.
//!
//! ## Task Lifecycle Events
//!
//! Async requests use a uniform lifecycle:
//! - The runtime emits `UiEvent::TaskStarted` once a task is actually spawned
//! - The runtime emits `UiEvent::TaskCompleted` with the result event when done
//! - The reducer is the only place that mutates `TaskState`
//!
//! ## Reveal Events
//!
//! A reveal task announces itself with `RevealStarted` (carrying its token)
//! and then sends one `RevealTick` per character. Both carry the generation
//! they were started for so the reducer can drop anything stale.

use crossterm::event::Event as CrosstermEvent;
use delia_core::api::{ApiError, Document, DocumentStats};
use tokio_util::sync::CancellationToken;

use crate::common::{TaskCompleted, TaskKind, TaskStarted};
use crate::transcript::CellId;

/// Unified event enum for the TUI.
#[derive(Debug)]
pub enum UiEvent {
    /// Timer tick (copy feedback and notice expiry, rendering cadence).
    Tick,

    /// Frame event for per-frame state updates (layout).
    ///
    /// Emitted once per frame before other events are processed.
    Frame { width: u16, height: u16 },

    /// Terminal input event (key, mouse, paste, resize).
    Terminal(CrosstermEvent),

    /// Task lifecycle: runtime started a task (cancel token optional).
    TaskStarted {
        kind: TaskKind,
        started: TaskStarted,
    },

    /// Task lifecycle: runtime completed a task (wraps the result event).
    TaskCompleted {
        kind: TaskKind,
        completed: TaskCompleted<Box<UiEvent>>,
    },

    /// Raw agent answer for the pending cell.
    ChatResult {
        cell: CellId,
        result: Result<String, ApiError>,
    },

    /// Login finished; `Ok` carries the access token.
    LoginResult(Result<String, ApiError>),

    StatsLoaded(Result<DocumentStats, ApiError>),

    DocumentsListed(Result<Vec<Document>, ApiError>),

    UploadResult {
        file: String,
        result: Result<(), ApiError>,
    },

    DatabaseCleared(Result<(), ApiError>),

    /// A reveal task is running for `generation`.
    RevealStarted {
        cell: CellId,
        generation: u64,
        cancel: CancellationToken,
    },

    /// One reveal step.
    RevealTick { cell: CellId, generation: u64 },
}
