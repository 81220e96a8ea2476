//! Knowledge base feature slice.
//!
//! Document statistics shown in the header, plus the notices reporting the
//! outcome of uploads and database clears.
//!
//! - `state.rs`: `KnowledgeState` and `Notice`
//! - `render.rs`: header bar and notice line

mod render;
mod state;

pub use render::{render_header, render_notice};
pub use state::{KnowledgeState, Notice, NoticeKind, SUCCESS_NOTICE_TTL, format_document_list};
