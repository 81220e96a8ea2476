//! Removes model reasoning markup from backend answers.
//!
//! Some backends return their chain-of-thought wrapped in `<think>`,
//! `<reasoning>` or `<thought>` tags. Users only ever see the answer, so the
//! envelopes (tags plus content) are stripped before display.

use std::sync::LazyLock;

use regex::Regex;

/// Tag names that wrap hidden reasoning.
pub const REASONING_TAGS: [&str; 3] = ["think", "reasoning", "thought"];

/// One compiled envelope pattern per tag, shared by the remover and the detector.
static REASONING_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    REASONING_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}>.*?</{tag}>"))
                .expect("reasoning tag pattern is valid")
        })
        .collect()
});

/// Newline, optional whitespace (including more newlines), newline.
static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").expect("blank line pattern is valid"));

/// Strips reasoning envelopes and normalizes whitespace.
///
/// Total and deterministic: text without reasoning markup only goes through
/// [`normalize_whitespace`].
pub fn sanitize(raw: &str) -> String {
    let mut stripped = raw.to_string();
    for pattern in REASONING_PATTERNS.iter() {
        stripped = pattern.replace_all(&stripped, "").into_owned();
    }

    if stripped.len() != raw.len() {
        tracing::debug!(
            removed_bytes = raw.len() - stripped.len(),
            "stripped reasoning markup from answer"
        );
    }

    normalize_whitespace(&stripped)
}

/// Returns true if `raw` contains at least one complete reasoning envelope.
pub fn contains_reasoning_markup(raw: &str) -> bool {
    REASONING_PATTERNS.iter().any(|pattern| pattern.is_match(raw))
}

/// Collapses runs of blank lines into a single newline and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    BLANK_LINES.replace_all(text, "\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "Hello world",
        "  padded  ",
        "line one\n\n\nline two",
        "a\n  \n\t\nb",
        "```python\ndef f():\n\n    pass\n```",
        "**bold** and # heading\n\n- item",
        "<b>not reasoning</b>",
        "<think>unterminated",
    ];

    #[test]
    fn test_removes_think_envelope() {
        assert_eq!(sanitize("<think>ignore me</think>Hello world"), "Hello world");
    }

    #[test]
    fn test_removes_all_tag_kinds_case_insensitive() {
        let raw = "<THINK>a</THINK>one <Reasoning>b</Reasoning>two <thought>c</thought>three";
        assert_eq!(sanitize(raw), "one two three");
    }

    #[test]
    fn test_removes_multiline_envelopes_non_greedy() {
        let raw = "<think>\nstep 1\nstep 2\n</think>\nkeep\n<think>x</think>\nalso keep";
        assert_eq!(sanitize(raw), "keep\nalso keep");
    }

    #[test]
    fn test_collapses_blank_lines_and_trims() {
        assert_eq!(sanitize("\n\nfirst\n\n \n\nsecond\n\n"), "first\nsecond");
    }

    #[test]
    fn test_unmatched_tags_are_left_in_place() {
        assert_eq!(sanitize("<think>no end"), "<think>no end");
        assert!(!contains_reasoning_markup("<think>no end"));
    }

    #[test]
    fn test_text_without_tags_only_normalizes_whitespace() {
        for sample in SAMPLES {
            assert_eq!(sanitize(sample), normalize_whitespace(sample), "{sample:?}");
        }
    }

    #[test]
    fn test_sanitize_is_idempotent_without_tags() {
        for sample in SAMPLES {
            let once = sanitize(sample);
            assert_eq!(sanitize(&once), once, "{sample:?}");
        }
    }

    #[test]
    fn test_detection_agrees_with_removal() {
        let tagged = [
            "<think></think>",
            "<think>a</think>b",
            "x<reasoning>\n\n</reasoning>",
            "<THOUGHT>hidden</THOUGHT> visible",
        ];
        for sample in tagged {
            assert!(contains_reasoning_markup(sample), "{sample:?}");
            assert_ne!(sanitize(sample), normalize_whitespace(sample), "{sample:?}");
        }
        for sample in SAMPLES {
            assert!(!contains_reasoning_markup(sample), "{sample:?}");
        }
    }
}
