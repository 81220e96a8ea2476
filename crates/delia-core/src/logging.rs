//! File logging.
//!
//! The terminal belongs to the TUI, so events go to a daily-rolling file under
//! `$DELIA_HOME/logs`. Filtering follows `DELIA_LOG` (EnvFilter syntax),
//! defaulting to `info`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::paths;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "DELIA_LOG";

const LOG_FILE_PREFIX: &str = "delia.log";
const DEFAULT_DIRECTIVE: &str = "info";

/// Installs the global subscriber writing to `$DELIA_HOME/logs`.
///
/// Keep the returned guard alive for the whole process; dropping it flushes
/// buffered lines.
pub fn init() -> Result<WorkerGuard> {
    init_in(&paths::logs_dir())
}

/// Installs the global subscriber writing to `dir`.
pub fn init_in(dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    Ok(guard)
}

/// Builds the filter from `DELIA_LOG`, falling back to `info` when unset or invalid.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_init_creates_log_dir_and_rejects_second_install() {
        let dir = TempDir::new().unwrap();
        let logs = dir.path().join("logs");

        let _guard = init_in(&logs).unwrap();
        assert!(logs.is_dir());

        let err = init_in(&logs).unwrap_err();
        assert!(err.to_string().contains("log subscriber"));
    }
}
