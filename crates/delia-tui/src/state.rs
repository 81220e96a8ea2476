//! Application state composition.
//!
//! ```text
//! AppState
//! ├── tui: TuiState
//! │   ├── input: InputState          (user input, sent-message history)
//! │   ├── transcript: TranscriptState (cells, scroll, copy targets)
//! │   ├── knowledge: KnowledgeState   (document stats, notices)
//! │   ├── task_seq: TaskSeq           (async task id generator)
//! │   ├── tasks: Tasks                (task lifecycle state)
//! │   └── token, agent, level         (session)
//! └── overlay: Option<Overlay>        (modal overlays)
//! ```
//!
//! State is split between `TuiState` and `Option<Overlay>` so overlay handlers
//! can hold `&mut self` and `&TuiState` at the same time.

use std::cell::Cell;

use delia_core::api::{Agent, UserLevel};
use delia_core::config::Config;
use ratatui::layout::Rect;

use crate::common::{TaskSeq, Tasks};
use crate::input::InputState;
use crate::knowledge::KnowledgeState;
use crate::overlays::{LoginState, Overlay};
use crate::transcript::{CellId, TranscriptState};

/// Combined application state for the TUI.
pub struct AppState {
    pub tui: TuiState,
    pub overlay: Option<Overlay>,
}

impl AppState {
    /// Creates the state for a session. Without a token the login form opens
    /// first.
    pub fn new(config: Config, agent: Agent, token: Option<String>) -> Self {
        let overlay = token
            .is_none()
            .then(|| Overlay::Login(LoginState::new(None)));
        Self {
            tui: TuiState::new(config, agent, token),
            overlay,
        }
    }
}

/// TUI application state (non-overlay).
pub struct TuiState {
    /// Flag indicating the app should quit.
    pub should_quit: bool,
    /// Loaded configuration (render preferences, defaults).
    pub config: Config,
    /// Bearer token of the current session.
    pub token: Option<String>,
    /// Agent questions are sent to.
    pub agent: Agent,
    /// Knowledge level sent with EDSL questions.
    pub level: UserLevel,
    pub input: InputState,
    pub transcript: TranscriptState,
    pub knowledge: KnowledgeState,
    /// Task id sequence for async operations.
    pub task_seq: TaskSeq,
    /// Task lifecycle state for async operations.
    pub tasks: Tasks,
    /// Pending assistant cell of the request in flight.
    pub chat_cell: Option<CellId>,
    /// Transcript area (set during render, used for mouse routing).
    pub transcript_area: Cell<Rect>,
}

impl TuiState {
    pub fn new(config: Config, agent: Agent, token: Option<String>) -> Self {
        let level = config.user_level;
        Self {
            should_quit: false,
            config,
            token,
            agent,
            level,
            input: InputState::default(),
            transcript: TranscriptState::new(),
            knowledge: KnowledgeState::default(),
            task_seq: TaskSeq::default(),
            tasks: Tasks::default(),
            chat_cell: None,
            transcript_area: Cell::new(Rect::default()),
        }
    }

    /// True while a chat request is in flight; input cannot be sent.
    pub fn is_waiting(&self) -> bool {
        self.chat_cell.is_some()
    }
}
