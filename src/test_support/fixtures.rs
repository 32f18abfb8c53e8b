//! On-disk recipe trees for tests.

use std::path::Path;

use tempfile::TempDir;

use crate::recipe::RECIPE_FILE;

/// A temporary recipe source directory laid out as
/// `<name>/<version>/recipe.lua`.
///
/// The directory is removed when the tree is dropped.
#[derive(Debug)]
pub struct RecipeTree {
    dir: TempDir,
}

impl RecipeTree {
    pub fn new() -> Self {
        RecipeTree {
            dir: TempDir::new().unwrap(),
        }
    }

    /// Write a recipe with a static `requires` list.
    pub fn recipe(self, name: &str, version: &str, requires: &[&str]) -> Self {
        let requires = requires
            .iter()
            .map(|r| format!("{:?}", r))
            .collect::<Vec<_>>()
            .join(", ");
        let source = format!(
            "return {{\n  name = {:?},\n  version = {:?},\n  requires = {{ {} }},\n}}\n",
            name, version, requires
        );
        self.raw_recipe(name, version, &source)
    }

    /// Write a recipe from raw Lua source.
    pub fn raw_recipe(self, name: &str, version: &str, source: &str) -> Self {
        let dir = self.dir.path().join(name).join(version);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(RECIPE_FILE), source).unwrap();
        self
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Default for RecipeTree {
    fn default() -> Self {
        RecipeTree::new()
    }
}
