//! Chat command handler.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use delia_core::api::Agent;
use delia_core::auth::TokenStore;
use delia_core::config::Config;

use crate::modes;

pub async fn run(config: &Config, agent: Agent) -> Result<()> {
    // Piped input means a one-shot question.
    if !std::io::stdin().is_terminal() {
        return super::ask::run(config, agent, None).await;
    }

    let token = TokenStore::default().load().context("load token")?;
    modes::run_interactive_chat(config, agent, token).context("interactive chat failed")
}
