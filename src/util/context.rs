//! Global context for Foundry operations.
//!
//! Provides centralized access to the working directory, the Foundry home
//! directory and the merged configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::BaseDirs;

use crate::util::config::{load_config, Config};

/// Environment variable overriding the Foundry home directory.
pub const HOME_ENV: &str = "FOUNDRY_HOME";

/// Global context containing paths and configuration.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global Foundry data (~/.foundry/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a context for the process's working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(GlobalContext {
            cwd,
            home: default_home(),
        })
    }

    /// Create a context with explicit paths.
    pub fn with_paths(cwd: impl Into<PathBuf>, home: impl Into<PathBuf>) -> Self {
        GlobalContext {
            cwd: cwd.into(),
            home: home.into(),
        }
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the Foundry home directory.
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Get the project-local Foundry directory.
    pub fn project_dir(&self) -> PathBuf {
        self.cwd.join(".foundry")
    }

    /// Get the project configuration file path.
    pub fn project_config_path(&self) -> PathBuf {
        self.project_dir().join("config.toml")
    }

    /// Get the directory of locally cached recipes.
    pub fn recipe_cache_dir(&self) -> PathBuf {
        self.home.join("recipes")
    }

    /// Load the merged global and project configuration.
    pub fn config(&self) -> Config {
        load_config(&self.config_path(), &self.project_config_path())
    }
}

fn default_home() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|h| !h.is_empty()) {
        return PathBuf::from(home);
    }

    BaseDirs::new()
        .map(|b| b.home_dir().join(".foundry"))
        .unwrap_or_else(|| PathBuf::from(".foundry"))
}
