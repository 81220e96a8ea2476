//! One-shot question.

use std::io::Read;

use anyhow::{Context, Result};
use delia_core::api::Agent;
use delia_core::config::Config;
use delia_core::sanitize::sanitize;

use super::{api_error, authorized_client};

pub async fn run(config: &Config, agent: Agent, prompt: Option<String>) -> Result<()> {
    let question = match prompt {
        Some(prompt) => prompt,
        None => {
            let mut input = String::new();
            std::io::stdin()
                .lock()
                .read_to_string(&mut input)
                .context("read question from stdin")?;
            input
        }
    };
    let question = question.trim();
    if question.is_empty() {
        anyhow::bail!("No question provided. Pass --prompt or pipe text on stdin.");
    }

    let client = authorized_client(config)?;
    tracing::info!(%agent, "asking one-shot question");
    let answer = client
        .ask(agent, question, config.user_level)
        .await
        .map_err(|e| api_error(e, "Question"))?;

    println!("{}", sanitize(&answer));
    Ok(())
}
