//! Transcript feature: message cells, Markdown rendering, typewriter reveal,
//! code-block copy feedback.

mod cell;
pub mod markdown;
mod render;
pub mod reveal;
mod state;
mod style;

pub use cell::{CellId, CellLines, CodeBlockState, MessageCell, Role};
pub use render::{convert_style, convert_styled_line, render_transcript};
pub use state::{CopyTarget, TranscriptLines, TranscriptState};
pub use style::{Rgb, Style, StyledLine, StyledSpan};
