//! Command implementations

pub mod build;
pub mod completions;
pub mod export;
pub mod list;
pub mod plan;

use anyhow::{Context, Result};

use crate::cli::{NamespaceArgs, SourceArgs};
use foundry::core::Namespace;
use foundry::ops::SourceOptions;
use foundry::util::Config;

/// Recipe sources from CLI flags layered over configuration.
///
/// Directories from both accumulate; either side can switch off the
/// working directory or the cache.
pub fn source_options(args: &SourceArgs, config: &Config) -> SourceOptions {
    let mut dirs = config.sources.dirs.clone();
    for dir in &args.sources {
        if !dirs.contains(dir) {
            dirs.push(dir.clone());
        }
    }

    SourceOptions {
        dirs,
        include_cwd: config.sources.cwd && !args.no_cwd,
        include_cache: config.sources.cache && !args.no_cache,
    }
}

/// The build namespace: CLI (or environment) over configuration.
pub fn namespace(args: &NamespaceArgs, config: &Config) -> Result<Namespace> {
    let user = args.user.as_deref().unwrap_or(config.user());
    let channel = args.channel.as_deref().unwrap_or(config.channel());
    Namespace::new(user, channel).context("invalid build namespace")
}

pub fn profile(args: &NamespaceArgs, config: &Config) -> String {
    args.profile
        .clone()
        .unwrap_or_else(|| config.profile().to_string())
}

pub fn manager_program(args: &NamespaceArgs, config: &Config) -> String {
    args.manager
        .clone()
        .unwrap_or_else(|| config.manager_program().to_string())
}
