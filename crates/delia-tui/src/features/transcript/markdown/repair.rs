//! Fence repair for partial or sloppy Markdown.
//!
//! Assistant text is rendered while it is still being revealed, so a prefix
//! can stop in the middle of a fenced block. `repair` rewrites the fences so
//! pulldown-cmark always sees balanced, line-aligned markers:
//!
//! 1. "```lang<whitespace>" becomes "```lang\n".
//! 2. An odd number of markers gets a closing "\n```" appended.
//! 3. Whitespace before a marker is dropped and the marker starts its own line
//!    (a marker at the very start of the text stays there).
//! 4. Prose directly before an opener is separated from it by a blank line.
//! 5. Code inside a tagged block is trimmed; untagged blocks only lose
//!    trailing whitespace.
//!
//! Prose glued to a closing marker moves to the next line, and code written
//! after the tag on an opener line moves into the block. Text without any
//! marker is returned unchanged.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

pub const FENCE: &str = "```";

/// Word-character language tag right after a marker, then a whitespace run.
static LANG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)\s+").expect("language tag pattern is valid"));

/// Repairs fenced code markers. Total and idempotent.
pub fn repair(text: &str) -> String {
    if !text.contains(FENCE) {
        return text.to_string();
    }

    let mut balanced = text.to_string();
    if fence_count(&balanced) % 2 == 1 {
        balanced.push('\n');
        balanced.push_str(FENCE);
    }

    // Even indices are prose, odd indices are block bodies (opener..closer).
    let segments: Vec<&str> = balanced.split(FENCE).collect();
    let mut out = String::with_capacity(balanced.len() + 8);
    for (idx, raw) in segments.iter().enumerate() {
        // Tags are matched per segment so they line up with the markers `split` found.
        let segment = if idx == 0 {
            Cow::Borrowed(*raw)
        } else {
            LANG_TAG.replace(raw, "$1\n")
        };
        if idx % 2 == 0 {
            push_prose(&mut out, &segment, idx == 0, idx + 1 < segments.len());
        } else {
            push_block(&mut out, &segment);
        }
    }
    out
}

/// Counts fence markers (the well-formedness measure: always even after `repair`).
pub fn fence_count(text: &str) -> usize {
    text.matches(FENCE).count()
}

fn push_prose(out: &mut String, segment: &str, at_start: bool, before_opener: bool) {
    let body = segment.trim_end();
    // Only whitespace between a closer and an opener: exactly one blank line.
    if before_opener && body.is_empty() {
        if !at_start {
            out.push_str("\n\n");
        }
        return;
    }

    // Prose after a closer begins on its own line.
    if !at_start && !segment.is_empty() && !segment.starts_with('\n') {
        out.push('\n');
    }

    if before_opener {
        out.push_str(body);
        out.push_str("\n\n");
    } else {
        out.push_str(segment);
    }
}

fn push_block(out: &mut String, segment: &str) {
    let (info_line, rest) = segment.split_once('\n').unwrap_or((segment, ""));
    let info = info_line.trim();

    // Code written on the opener line after the tag joins the body.
    let joined;
    let (info, code) = match LANG_TAG.captures(info) {
        Some(caps) => {
            let tag_end = caps.get(0).map_or(0, |m| m.end());
            joined = format!("{}\n{rest}", &info[tag_end..]);
            (caps.get(1).map_or("", |m| m.as_str()), joined.trim())
        }
        None if info.is_empty() => (info, rest.trim_end()),
        None => (info, rest.trim()),
    };

    out.push_str(FENCE);
    out.push_str(info);
    out.push('\n');
    if !code.is_empty() {
        out.push_str(code);
        out.push('\n');
    }
    out.push_str(FENCE);
}
