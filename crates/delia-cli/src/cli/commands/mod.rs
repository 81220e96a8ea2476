//! CLI command handlers.

pub mod ask;
pub mod auth;
pub mod chat;
pub mod config;
pub mod docs;

use anyhow::{Context, Result};
use delia_core::api::{ApiClient, ApiError};
use delia_core::auth::TokenStore;
use delia_core::config::Config;

/// Client carrying the stored token, for commands that need a session.
pub(crate) fn authorized_client(config: &Config) -> Result<ApiClient> {
    let token = TokenStore::default().load().context("load token")?;
    if token.is_none() {
        anyhow::bail!("Not logged in. Run `delia login` first.");
    }
    Ok(ApiClient::from_config(config)?.with_token(token))
}

/// Turns an API failure into a CLI error. A rejected token is forgotten so the
/// next run starts clean.
pub(crate) fn api_error(err: ApiError, action: &str) -> anyhow::Error {
    if err.is_unauthorized() {
        if let Err(clear_err) = TokenStore::default().clear() {
            tracing::warn!("could not remove token: {clear_err:#}");
        }
        return anyhow::anyhow!("{action} failed: session expired. Run `delia login` again.");
    }
    anyhow::Error::new(err).context(format!("{action} failed"))
}
