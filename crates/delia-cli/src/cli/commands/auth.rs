//! Login/logout command handlers.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use delia_core::api::ApiClient;
use delia_core::auth::TokenStore;
use delia_core::config::Config;

pub async fn login(
    config: &Config,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let username = match username {
        Some(username) => username,
        None => prompt_line("Username: ")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_line("Password: ")?,
    };
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        anyhow::bail!("Username and password are required.");
    }

    let client = ApiClient::from_config(config)?;
    let response = client.login(username, &password).await.map_err(|e| {
        if e.is_unauthorized() {
            anyhow::anyhow!("Login failed: incorrect username or password.")
        } else {
            anyhow::Error::new(e).context("Login failed")
        }
    })?;

    let store = TokenStore::default();
    store.save(&response.access_token)?;
    println!("Logged in as {username}.");
    println!("Token saved to {}", store.path().display());
    Ok(())
}

pub fn logout() -> Result<()> {
    let store = TokenStore::default();
    if store.clear()? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

/// Reads one line from stdin after printing `label` on stderr.
fn prompt_line(label: &str) -> Result<String> {
    let mut err = io::stderr();
    write!(err, "{label}")?;
    err.flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
