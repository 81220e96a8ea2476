//! Markdown rendering for assistant messages.
//!
//! - `repair()`: balance and line-align code fences of partial text
//! - `render_markdown()`: parse into styled lines plus code blocks
//! - `wrap_styled_spans()`: wrap styled spans across line breaks

mod highlight;
mod parse;
pub mod repair;
mod wrap;

pub use parse::{CodeBlock, MarkdownDocument, render_markdown};
pub use repair::{fence_count, repair};
pub use wrap::{WrapOptions, wrap_styled_spans};

/// Repairs then renders: the only path assistant text takes to the screen.
pub fn render_repaired(text: &str, width: usize) -> MarkdownDocument {
    render_markdown(&repair(text), width)
}
