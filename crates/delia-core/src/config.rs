//! Configuration management for DELIA.
//!
//! Loads configuration from ${DELIA_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{Agent, UserLevel};

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
/// To update, edit default_config.toml directly.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// New comments/sections from the template stay present while the user's
/// customized values win.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;

    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source.iter() {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for DELIA configuration and data directories.
    //!
    //! DELIA_HOME resolution order:
    //! 1. DELIA_HOME environment variable (if set)
    //! 2. ~/.config/delia (default)

    use std::path::PathBuf;

    /// Returns the DELIA home directory.
    ///
    /// Checks DELIA_HOME env var first, falls back to ~/.config/delia.
    /// Falls back to a relative `.delia` directory when no home exists.
    pub fn delia_home() -> PathBuf {
        if let Ok(home) = std::env::var("DELIA_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".delia"),
            |h| h.join(".config").join("delia"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        delia_home().join("config.toml")
    }

    /// Returns the path of the stored bearer token.
    pub fn token_path() -> PathBuf {
        delia_home().join("token")
    }

    /// Returns the directory that receives log files.
    pub fn logs_dir() -> PathBuf {
        delia_home().join("logs")
    }
}

/// Rendering preferences for assistant answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Reveal plain-text answers character by character.
    pub typewriter: bool,
    /// Delay between revealed characters, in milliseconds.
    pub reveal_interval_ms: u64,
    /// How long a code block shows its copied indicator, in milliseconds.
    pub copy_feedback_ms: u64,
}

impl RenderConfig {
    pub const DEFAULT_REVEAL_INTERVAL_MS: u64 = 15;
    pub const DEFAULT_COPY_FEEDBACK_MS: u64 = 1500;

    /// Interval between reveal ticks (never zero).
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms.max(1))
    }

    pub fn copy_feedback(&self) -> Duration {
        Duration::from_millis(self.copy_feedback_ms)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            typewriter: true,
            reveal_interval_ms: Self::DEFAULT_REVEAL_INTERVAL_MS,
            copy_feedback_ms: Self::DEFAULT_COPY_FEEDBACK_MS,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the backend API.
    pub api_url: String,

    /// EDSL chat endpoint path, relative to `api_url`.
    pub edsl_chat_path: String,

    /// Request timeout in seconds (0 disables).
    pub request_timeout_secs: u64,

    /// Agent used when none is requested explicitly.
    pub default_agent: Agent,

    /// Knowledge level sent to the EDSL agent.
    pub user_level: UserLevel,

    /// Rendering preferences.
    #[serde(default)]
    pub render: RenderConfig,
}

impl Config {
    pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
    const DEFAULT_EDSL_CHAT_PATH: &str = "/chat/delia";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
    const API_URL_ENV: &str = "DELIA_API_URL";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Returns the API base URL, preferring `DELIA_API_URL` when set.
    ///
    /// The URL is validated and returned without a trailing slash.
    pub fn effective_api_url(&self) -> Result<String> {
        let from_env = std::env::var(Self::API_URL_ENV).ok();
        let candidate = from_env
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.api_url.trim());

        url::Url::parse(candidate).with_context(|| format!("Invalid API URL: {candidate}"))?;
        Ok(candidate.trim_end_matches('/').to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.request_timeout_secs))
        }
    }

    /// Saves only the user_level field to the config file.
    ///
    /// Creates the file if it doesn't exist.
    /// Preserves existing fields and comments using toml_edit.
    pub fn save_user_level(level: UserLevel) -> Result<()> {
        Self::save_user_level_to(&paths::config_path(), level)
    }

    /// Saves only the user_level field to a specific config file path.
    ///
    /// Creates the file with default template if it doesn't exist.
    /// If file exists, merges user values into the latest template.
    pub fn save_user_level_to(path: &Path, level: UserLevel) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["user_level"] = value(level.as_str());

        Self::write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: Self::DEFAULT_API_URL.to_string(),
            edsl_chat_path: Self::DEFAULT_EDSL_CHAT_PATH.to_string(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            default_agent: Agent::default(),
            user_level: UserLevel::default(),
            render: RenderConfig::default(),
        }
    }
}
