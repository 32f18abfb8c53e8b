//! Collecting recipes from the configured source directories.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use tracing::debug;

use crate::sources::AggregatedRecipes;
use crate::util::fs::normalize_path;
use crate::util::GlobalContext;

/// Which directories recipes are collected from.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Extra source directories, in priority order
    pub dirs: Vec<PathBuf>,
    /// Include the working directory
    pub include_cwd: bool,
    /// Include the recipe cache, if it exists
    pub include_cache: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        SourceOptions {
            dirs: Vec::new(),
            include_cwd: true,
            include_cache: true,
        }
    }
}

/// The source directories to aggregate, without duplicates.
///
/// Order: working directory, recipe cache, then extra directories.
pub fn collect_source_dirs(ctx: &GlobalContext, opts: &SourceOptions) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if opts.include_cwd {
        candidates.push(ctx.cwd().to_path_buf());
    }

    let cache = ctx.recipe_cache_dir();
    if opts.include_cache && cache.is_dir() {
        candidates.push(cache);
    }

    for dir in &opts.dirs {
        candidates.push(if dir.is_relative() {
            ctx.cwd().join(dir)
        } else {
            dir.clone()
        });
    }

    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in candidates {
        let dir = normalize_path(&dir);
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }

    debug!("recipe sources: {:?}", dirs);
    dirs
}

/// Aggregate every configured source into one temporary recipe root.
pub fn load_recipes(ctx: &GlobalContext, opts: &SourceOptions) -> Result<AggregatedRecipes> {
    AggregatedRecipes::aggregate(&collect_source_dirs(ctx, opts))
}

/// One package name and its available versions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeListing {
    pub name: String,
    /// In natural order, oldest first
    pub versions: Vec<String>,
    pub latest: String,
}

/// List every available recipe, grouped by name.
pub fn list_recipes(ctx: &GlobalContext, opts: &SourceOptions) -> Result<Vec<RecipeListing>> {
    let aggregated = load_recipes(ctx, opts)?;
    let recipes = aggregated.recipes();

    let listings = recipes
        .names()
        .into_iter()
        .filter_map(|name| {
            let versions: Vec<String> =
                recipes.versions(name).into_iter().map(str::to_string).collect();
            let latest = versions.last()?.clone();
            Some(RecipeListing {
                name: name.to_string(),
                versions,
                latest,
            })
        })
        .collect();

    Ok(listings)
}
