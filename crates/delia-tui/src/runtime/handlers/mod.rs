//! Effect handlers for the TUI runtime.
//!
//! Handlers perform I/O and never touch state. Request handlers are plain
//! async functions returning the `UiEvent` that carries their result; the
//! runtime spawns them and forwards the event to the inbox.
//!
//! ```ignore
//! // Handler: pure async, returns UiEvent
//! pub async fn load_stats(client: ApiClient) -> UiEvent { ... }
//!
//! // Runtime: spawns and sends to inbox
//! self.spawn_task(TaskKind::Stats, TaskMeta::None, false, move |_| load_stats(client));
//! ```

pub mod auth;
pub mod chat;
pub mod knowledge;
pub mod reveal;

pub use auth::*;
pub use chat::*;
pub use knowledge::*;
pub use reveal::*;
