//! Terminal lifecycle management.
//!
//! The terminal is restored on normal exit (via the runtime's `Drop`) and on
//! panic (via the hook installed here).

use std::io::{self, Stdout};
use std::panic;

use anyhow::{Context, Result};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Enters raw mode and the alternate screen.
///
/// Call `install_panic_hook()` first.
///
/// # Errors
/// Returns an error if the terminal cannot be switched.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

/// Enables bracketed paste and mouse capture (wheel scrolling, copy clicks).
///
/// # Errors
/// Returns an error if the escape sequences cannot be written.
pub fn enable_input_features() -> Result<()> {
    execute!(io::stdout(), EnableBracketedPaste, EnableMouseCapture)
        .context("Failed to enable input features")
}

/// Counterpart of `enable_input_features()` for normal exit paths.
///
/// # Errors
/// Returns an error if the escape sequences cannot be written.
pub fn disable_input_features() -> Result<()> {
    execute!(io::stdout(), DisableMouseCapture, DisableBracketedPaste)
        .context("Failed to disable input features")
}

/// Restores the terminal. Idempotent.
///
/// # Errors
/// Returns an error if the alternate screen or raw mode cannot be left.
pub fn restore_terminal() -> Result<()> {
    // Must happen while still in raw mode.
    let _ = execute!(io::stdout(), DisableMouseCapture, DisableBracketedPaste);
    execute!(io::stdout(), LeaveAlternateScreen).context("Failed to leave alternate screen")?;
    disable_raw_mode().context("Failed to disable raw mode")
}

/// Restores the terminal before the default hook prints the panic.
pub fn install_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}
