//! Syntax highlighting for fenced code blocks (syntect).

use std::sync::LazyLock;

use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::features::transcript::{Rgb, Style, StyledSpan};

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const THEME: &str = "base16-ocean.dark";

fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    let token = lang.trim().to_ascii_lowercase();
    if token.is_empty() {
        return None;
    }
    SYNTAX_SET
        .find_syntax_by_token(&token)
        .or_else(|| SYNTAX_SET.find_syntax_by_extension(&token))
}

/// Highlights `code` line by line.
///
/// Returns `None` for an unknown language or when the highlighter fails, so
/// the caller can fall back to plain code styling. Never panics.
pub fn highlight_code(code: &str, lang: &str) -> Option<Vec<Vec<StyledSpan>>> {
    let syntax = find_syntax(lang)?;
    let theme = THEME_SET.themes.get(THEME)?;
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut lines = Vec::new();
    for line in code.split('\n') {
        // The newline-aware grammars expect the terminator.
        let with_newline = format!("{line}\n");
        let ranges = match highlighter.highlight_line(&with_newline, &SYNTAX_SET) {
            Ok(ranges) => ranges,
            Err(err) => {
                tracing::debug!(%err, lang, "syntax highlighting failed");
                return None;
            }
        };

        let spans = ranges
            .into_iter()
            .filter_map(|(style, text)| {
                let text = text.trim_end_matches('\n');
                if text.is_empty() {
                    return None;
                }
                let fg = style.foreground;
                Some(StyledSpan::new(
                    text,
                    Style::Syntax(Rgb {
                        r: fg.r,
                        g: fg.g,
                        b: fg.b,
                    }),
                ))
            })
            .collect();
        lines.push(spans);
    }
    Some(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_language_gets_colours() {
        let lines = highlight_code("def f():\n    return 1", "python").unwrap();
        assert_eq!(lines.len(), 2);
        assert!(
            lines
                .iter()
                .flatten()
                .all(|s| matches!(s.style, Style::Syntax(_)))
        );
        let text: String = lines[1].iter().map(|s| s.text.as_str()).collect();
        assert_eq!(text, "    return 1");
    }

    #[test]
    fn test_unknown_language_falls_back() {
        assert!(highlight_code("x", "not-a-language").is_none());
        assert!(find_syntax("").is_none());
        assert!(find_syntax(" Rust ").is_some());
    }
}
