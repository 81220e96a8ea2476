//! Bearer token storage.
//!
//! Stores the access token in `$DELIA_HOME/token` with restricted permissions (0600).
//! Tokens are never logged or displayed in full.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::paths;

/// File-backed store for the access token returned by `/auth/token`.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl Default for TokenStore {
    fn default() -> Self {
        Self::new(paths::token_path())
    }
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored token.
    /// Returns `None` if no token file exists or it is empty.
    pub fn load(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read token from {}", self.path.display()))?;
        let token = contents.trim();
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(token.to_string()))
        }
    }

    /// Saves the token to disk with restricted permissions (0600).
    pub fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(token.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(token.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        tracing::info!(path = %self.path.display(), "stored access token");
        Ok(())
    }

    /// Removes the stored token. Returns true if a token was present.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        tracing::info!("cleared access token");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_load_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("token"));

        store.save("abc123").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));

        store.save("def456").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("def456"));
    }

    #[test]
    fn test_blank_file_is_no_token() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token");
        fs::write(&path, "  \n").unwrap();
        assert_eq!(TokenStore::new(path).load().unwrap(), None);
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        assert!(!store.clear().unwrap());

        store.save("abc").unwrap();
        assert!(store.clear().unwrap());
        assert_eq!(store.load().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_token_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = TokenStore::new(dir.path().join("token"));
        store.save("secret").unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
