//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! They represent I/O and task spawning only (no direct UI mutations).
//!
//! ## Cancellation Effects
//!
//! Cancellation is initiated from the reducer via `UiEffect::CancelTask`.
//! The runtime executes these by calling `token.cancel()` on the provided token.
//! Reveal animations use the same path: the reducer owns their tokens.

use std::path::PathBuf;
use std::time::Duration;

use delia_core::api::{Agent, UserLevel};
use tokio_util::sync::CancellationToken;

use crate::transcript::CellId;

/// Effects returned by the reducer for the runtime to execute.
#[derive(Debug)]
pub enum UiEffect {
    /// Quit the application.
    Quit,

    /// Ask the selected agent; the answer lands in the pending cell `cell`.
    SendChat {
        cell: CellId,
        agent: Agent,
        level: UserLevel,
        question: String,
    },

    /// Exchange credentials for a token and store it.
    Login { username: String, password: String },

    /// Delete the stored token.
    ClearToken,

    /// Refresh knowledge base statistics.
    LoadStats,

    /// Fetch the uploaded document list.
    ListDocuments,

    /// Upload a document into the knowledge base.
    UploadDocument { path: PathBuf },

    /// Delete every document.
    ClearDatabase,

    /// Copy text to clipboard.
    CopyToClipboard {
        /// Text to copy.
        text: String,
    },

    /// Spawn the periodic task revealing `cell` one character per tick.
    StartReveal {
        cell: CellId,
        generation: u64,
        steps: usize,
        interval: Duration,
    },

    /// Persist the EDSL level preference to config.
    PersistUserLevel { level: UserLevel },

    // ========================================================================
    // Cancellation Effects
    // ========================================================================
    /// Cancel an in-progress task or reveal.
    CancelTask { token: Option<CancellationToken> },
}

impl UiEffect {
    /// Cancellation effects for a batch of tokens.
    pub fn cancel_all(tokens: impl IntoIterator<Item = CancellationToken>) -> Vec<UiEffect> {
        tokens
            .into_iter()
            .map(|token| UiEffect::CancelTask { token: Some(token) })
            .collect()
    }
}
