//! Merging several recipe source directories into one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::core::PackageRef;
use crate::resolver::ResolveError;
use crate::sources::recipe_dir::RecipeDir;
use crate::util::fs::copy_dir_all;

/// Recipes from every source directory, copied into a temporary root.
///
/// The temporary root lives exactly as long as this value and is removed
/// on drop, whether the run succeeds or fails.
#[derive(Debug)]
pub struct AggregatedRecipes {
    _dir: TempDir,
    recipes: RecipeDir,
}

impl AggregatedRecipes {
    /// Copy the recipes found under each of `sources` into a fresh
    /// temporary directory.
    ///
    /// Sources that do not exist are skipped with a warning. Two sources
    /// providing the same name and version is an error.
    pub fn aggregate(sources: &[PathBuf]) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("foundry-recipes-")
            .tempdir()
            .context("failed to create temporary recipe directory")?;

        let mut origins: HashMap<PackageRef, PathBuf> = HashMap::new();

        for source in sources {
            if !source.is_dir() {
                warn!("recipe source {} does not exist, skipping", source.display());
                continue;
            }

            let found = RecipeDir::scan(source)?;
            debug!("{}: {} recipe(s)", source.display(), found.len());

            for recipe in found.sources() {
                if let Some(first) = origins.get(&recipe.package) {
                    return Err(ResolveError::ConflictingSource {
                        package: recipe.package.to_string(),
                        first: first.clone(),
                        second: recipe.dir.clone(),
                    }
                    .into());
                }

                let target = dir
                    .path()
                    .join(recipe.package.name())
                    .join(recipe.package.version());
                copy_dir_all(&recipe.dir, &target)?;
                origins.insert(recipe.package.clone(), recipe.dir.clone());
            }
        }

        let recipes = RecipeDir::scan(dir.path())?;
        Ok(AggregatedRecipes { _dir: dir, recipes })
    }

    /// The merged recipe set.
    pub fn recipes(&self) -> &RecipeDir {
        &self.recipes
    }

    /// The temporary root the recipes were copied into.
    pub fn root(&self) -> &Path {
        self.recipes.root()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::RecipeProvider;
    use crate::test_support::{pkg, RecipeTree};

    #[test]
    fn test_merges_sources() {
        let first = RecipeTree::new().recipe("libfoo", "1.0", &[]);
        let second = RecipeTree::new()
            .recipe("libfoo", "2.0", &[])
            .recipe("libbar", "1.0", &[]);

        let merged = AggregatedRecipes::aggregate(&[
            first.path().to_path_buf(),
            second.path().to_path_buf(),
            PathBuf::from("/nonexistent/recipes"),
        ])
        .unwrap();

        assert_eq!(
            merged.recipes().available(),
            vec![pkg("libbar/1.0"), pkg("libfoo/1.0"), pkg("libfoo/2.0")]
        );
        assert!(merged.root().join("libfoo/2.0/recipe.lua").exists());
    }

    #[test]
    fn test_temporary_root_is_removed() {
        let source = RecipeTree::new().recipe("libfoo", "1.0", &[]);
        let merged = AggregatedRecipes::aggregate(&[source.path().to_path_buf()]).unwrap();
        let root = merged.root().to_path_buf();

        assert!(root.exists());
        drop(merged);
        assert!(!root.exists());
    }

    #[test]
    fn test_duplicate_recipe_conflicts() {
        let first = RecipeTree::new().recipe("libfoo", "1.0", &[]);
        let second = RecipeTree::new().recipe("libfoo", "1.0", &[]);

        let err = AggregatedRecipes::aggregate(&[
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ])
        .unwrap_err();

        match err.downcast_ref::<ResolveError>() {
            Some(ResolveError::ConflictingSource { package, .. }) => {
                assert_eq!(package, "libfoo/1.0");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
