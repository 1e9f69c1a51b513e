//! Path resolution for accessaid configuration and data files.
//!
//! All accessaid data is stored in `~/.accessaid/`:
//! - `config.yaml` - Main configuration file
//! - `accessaid.db` - SQLite database holding persisted snapshots

use std::path::PathBuf;

use crate::error::AccessAidError;

/// Environment variable that overrides the data directory.
pub const HOME_OVERRIDE_VAR: &str = "ACCESSAID_HOME";

/// Paths to accessaid configuration and data files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.accessaid/`
    pub root: PathBuf,
    /// Config file: `~/.accessaid/config.yaml`
    pub config_file: PathBuf,
    /// Database file: `~/.accessaid/accessaid.db`
    pub database: PathBuf,
}

impl Paths {
    /// Resolve paths from `ACCESSAID_HOME`, or `~/.accessaid` when unset.
    ///
    /// # Errors
    ///
    /// Returns an error if neither variable is available.
    pub fn new() -> Result<Self, AccessAidError> {
        if let Ok(root) = std::env::var(HOME_OVERRIDE_VAR) {
            return Ok(Self::with_root(PathBuf::from(root)));
        }

        let home = std::env::var("HOME").map_err(|_| {
            AccessAidError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".accessaid")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            database: root.join("accessaid.db"),
            root,
        }
    }

    /// Ensure the root directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), AccessAidError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                AccessAidError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }
        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_root(PathBuf::from(".accessaid")))
    }
}
