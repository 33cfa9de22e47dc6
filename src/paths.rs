//! XDG-compliant path resolution for govgraph.
//!
//! Config lives under `$XDG_CONFIG_HOME/govgraph/`, the stored session
//! credential under `$XDG_STATE_HOME/govgraph/`, following the XDG Base
//! Directory Specification with the usual `~/.config` / `~/.local/state`
//! fallbacks.

use std::path::PathBuf;

use crate::error::{GovResult, PathError};

/// Resolved per-user directories for govgraph.
#[derive(Debug, Clone)]
pub struct GovPaths {
    /// `$XDG_CONFIG_HOME/govgraph/`
    pub config_dir: PathBuf,
    /// `$XDG_STATE_HOME/govgraph/`
    pub state_dir: PathBuf,
}

impl GovPaths {
    /// Resolve XDG directories from environment variables with standard fallbacks.
    pub fn resolve() -> GovResult<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| PathError::NoHome)?;

        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".config"))
            .join("govgraph");

        let state_dir = std::env::var("XDG_STATE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local/state"))
            .join("govgraph");

        Ok(Self {
            config_dir,
            state_dir,
        })
    }

    /// Build paths rooted at an explicit directory (tests, `--state-dir`).
    pub fn rooted(dir: &std::path::Path) -> Self {
        Self {
            config_dir: dir.join("config"),
            state_dir: dir.join("state"),
        }
    }

    /// Path of the TOML config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Path of the persisted session credential.
    pub fn session_file(&self) -> PathBuf {
        self.state_dir.join("session.json")
    }

    /// Create the state directory if it does not exist yet.
    pub fn ensure_state_dir(&self) -> GovResult<()> {
        std::fs::create_dir_all(&self.state_dir).map_err(|source| PathError::CreateDir {
            path: self.state_dir.display().to_string(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_paths_stay_under_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = GovPaths::rooted(dir.path());
        assert!(paths.config_file().starts_with(dir.path()));
        assert!(paths.session_file().starts_with(dir.path()));
    }

    #[test]
    fn ensure_state_dir_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let paths = GovPaths::rooted(dir.path());
        paths.ensure_state_dir().unwrap();
        assert!(paths.state_dir.is_dir());
    }
}
