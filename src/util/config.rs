//! Configuration file support for Foundry.
//!
//! Foundry reads two configuration files:
//! - Global: `~/.foundry/config.toml` - User-wide defaults
//! - Project: `.foundry/config.toml` - Overrides for one working directory
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::fs::read_to_string;

/// Default user packages are built under.
pub const DEFAULT_USER: &str = "foundry";

/// Default channel packages are built under.
pub const DEFAULT_CHANNEL: &str = "stable";

/// Default package-manager profile.
pub const DEFAULT_PROFILE: &str = "default";

/// Default package-manager executable.
pub const DEFAULT_MANAGER: &str = "conan";

/// Foundry configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub build: BuildConfig,
    pub sources: SourcesConfig,
    pub manager: ManagerConfig,
}

/// The namespace, profile and options packages are built with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub user: Option<String>,
    pub channel: Option<String>,
    pub profile: Option<String>,

    /// Options forwarded to every build (`PKG:OPTION=VALUE`)
    pub options: Vec<String>,

    /// Remote to upload built packages to
    pub remote: Option<String>,
}

/// Where recipes are collected from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Extra recipe source directories
    pub dirs: Vec<PathBuf>,

    /// Include the working directory
    pub cwd: bool,

    /// Include the recipe cache (`~/.foundry/recipes`)
    pub cache: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            dirs: Vec::new(),
            cwd: true,
            cache: true,
        }
    }
}

/// The external package manager.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub program: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;

        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))?;

        // Relative source dirs are relative to the file that names them.
        if let Some(base) = path.parent().and_then(Path::parent) {
            for dir in &mut config.sources.dirs {
                if dir.is_relative() {
                    *dir = base.join(&*dir);
                }
            }
        }

        Ok(config)
    }

    /// Load configuration with fallback to defaults if the file doesn't
    /// exist or can't be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    ///
    /// Source directories accumulate rather than replace.
    pub fn merge(&mut self, other: Config) {
        if other.build.user.is_some() {
            self.build.user = other.build.user;
        }
        if other.build.channel.is_some() {
            self.build.channel = other.build.channel;
        }
        if other.build.profile.is_some() {
            self.build.profile = other.build.profile;
        }
        if !other.build.options.is_empty() {
            self.build.options = other.build.options;
        }
        if other.build.remote.is_some() {
            self.build.remote = other.build.remote;
        }

        for dir in other.sources.dirs {
            if !self.sources.dirs.contains(&dir) {
                self.sources.dirs.push(dir);
            }
        }
        if !other.sources.cwd {
            self.sources.cwd = false;
        }
        if !other.sources.cache {
            self.sources.cache = false;
        }

        if other.manager.program.is_some() {
            self.manager.program = other.manager.program;
        }
    }

    pub fn user(&self) -> &str {
        self.build.user.as_deref().unwrap_or(DEFAULT_USER)
    }

    pub fn channel(&self) -> &str {
        self.build.channel.as_deref().unwrap_or(DEFAULT_CHANNEL)
    }

    pub fn profile(&self) -> &str {
        self.build.profile.as_deref().unwrap_or(DEFAULT_PROFILE)
    }

    pub fn manager_program(&self) -> &str {
        self.manager.program.as_deref().unwrap_or(DEFAULT_MANAGER)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.foundry/config.toml)
/// 2. Global config (~/.foundry/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    if global_path.exists() {
        config.merge(Config::load_or_default(global_path));
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}
