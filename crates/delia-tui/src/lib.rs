//! Full-screen chat client for the DELIA knowledge base.

pub mod common;
pub mod effects;
pub mod events;
pub mod features;
pub mod mutations;
pub mod overlays;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, Write, stderr};

use anyhow::Result;
use delia_core::api::Agent;
use delia_core::config::{Config, paths};
pub use features::transcript::markdown;
pub use features::{input, knowledge, transcript};
pub use runtime::TuiRuntime;

/// Runs the interactive chat until the user quits.
///
/// Without a `token` the login form opens first.
///
/// # Errors
/// Returns an error if stderr is not a terminal or the terminal fails.
pub fn run_interactive_chat(config: &Config, agent: Agent, token: Option<String>) -> Result<()> {
    if !stderr().is_terminal() {
        anyhow::bail!(
            "Chat mode requires a terminal.\n\
             Use `delia ask '...'` for non-interactive questions."
        );
    }

    // Shown until the alternate screen takes over.
    let mut err = stderr();
    writeln!(err, "DELIA")?;
    writeln!(err, "Backend: {}", config.effective_api_url()?)?;
    writeln!(err, "Agent: {}", agent.label())?;
    err.flush()?;

    let mut runtime = TuiRuntime::new(config.clone(), agent, token)?;
    let config_path = paths::config_path();
    if config_path.exists() {
        runtime
            .state
            .tui
            .transcript
            .push(transcript::MessageCell::system(format!(
                "Config file: {}",
                config_path.display()
            )));
    }
    runtime.run()?;
    drop(runtime);

    writeln!(stderr(), "Goodbye!")?;
    Ok(())
}
