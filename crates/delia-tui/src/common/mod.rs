//! Shared leaf types for TUI features (clipboard, tasks, scrollbar, text helpers).
//!
//! Must not import `UiEvent` or feature state.

pub mod clipboard;
pub mod commands;
pub mod scrollbar;
pub mod task;
pub mod text;

pub use clipboard::Clipboard;
pub use scrollbar::Scrollbar;
pub use task::{TaskCompleted, TaskId, TaskKind, TaskMeta, TaskSeq, TaskStarted, Tasks};
pub use text::{format_file_size, sanitize_for_display, truncate_with_ellipsis};
