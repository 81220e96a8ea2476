//! Clipboard access for code-block copy.
//!
//! OSC 52 goes first since it also works over SSH; the system clipboard
//! (`arboard`) is the fallback.

use std::fmt;
use std::io::Write;

use base64::Engine;

/// Terminals commonly drop OSC 52 payloads past this size.
const OSC52_MAX_ENCODED: usize = 100_000;

pub struct Clipboard;

impl Clipboard {
    /// Copies `text`, returning the error of the last transport tried.
    pub fn copy(text: &str) -> Result<(), ClipboardError> {
        match Self::copy_osc52(text) {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::debug!(%err, "falling back to system clipboard");
                Self::copy_system(text)
            }
        }
    }

    fn copy_osc52(text: &str) -> Result<(), ClipboardError> {
        let sequence = osc52_sequence(text, std::env::var_os("TMUX").is_some())?;
        let mut stdout = std::io::stdout();
        stdout
            .write_all(sequence.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|e| ClipboardError::Osc52(e.to_string()))
    }

    fn copy_system(text: &str) -> Result<(), ClipboardError> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| ClipboardError::System(e.to_string()))?;
        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::System(e.to_string()))
    }
}

/// Builds the `ESC ] 52 ; c ; <base64> ESC \` sequence, wrapped in a DCS
/// passthrough when running inside tmux.
fn osc52_sequence(text: &str, tmux: bool) -> Result<String, ClipboardError> {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text);
    if encoded.len() > OSC52_MAX_ENCODED {
        return Err(ClipboardError::Osc52(format!(
            "payload too large ({} bytes)",
            encoded.len()
        )));
    }
    let osc = format!("\x1b]52;c;{encoded}\x1b\\");
    if tmux {
        Ok(format!("\x1bPtmux;{}\x1b\\", osc.replace('\x1b', "\x1b\x1b")))
    } else {
        Ok(osc)
    }
}

#[derive(Debug)]
pub enum ClipboardError {
    Osc52(String),
    System(String),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClipboardError::Osc52(msg) => write!(f, "OSC 52 clipboard failed: {msg}"),
            ClipboardError::System(msg) => write!(f, "System clipboard failed: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence() {
        let seq = osc52_sequence("hi", false).unwrap();
        assert_eq!(seq, "\x1b]52;c;aGk=\x1b\\");
    }

    #[test]
    fn test_osc52_tmux_passthrough() {
        let seq = osc52_sequence("hi", true).unwrap();
        assert!(seq.starts_with("\x1bPtmux;\x1b\x1b]52;c;aGk="));
        assert!(seq.ends_with("\x1b\\"));
    }

    #[test]
    fn test_osc52_rejects_huge_payload() {
        let big = "x".repeat(OSC52_MAX_ENCODED);
        assert!(matches!(
            osc52_sequence(&big, false),
            Err(ClipboardError::Osc52(_))
        ));
    }
}
