//! Interactive chat entry point.
//!
//! The full-screen UI is an optional feature; one-shot commands work without it.

#[cfg(feature = "tui")]
pub use delia_tui::run_interactive_chat;

#[cfg(not(feature = "tui"))]
pub fn run_interactive_chat(
    _config: &delia_core::config::Config,
    _agent: delia_core::api::Agent,
    _token: Option<String>,
) -> anyhow::Result<()> {
    anyhow::bail!("TUI support is disabled in this build (feature \"tui\").");
}
