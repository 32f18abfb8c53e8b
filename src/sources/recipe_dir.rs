//! A directory of recipes laid out as `<root>/<name>/<version>/recipe.lua`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::core::version;
use crate::core::{PackageRef, PackageSpec};
use crate::recipe::{LuaRecipe, RecipeError, RecipeHandle, RecipeProvider, RECIPE_FILE};
use crate::resolver::ResolveError;
use crate::util::fs::glob_files;

/// Where the recipe for one package version lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeSource {
    pub package: PackageRef,
    /// The `<name>/<version>` directory
    pub dir: PathBuf,
}

impl RecipeSource {
    pub fn recipe_path(&self) -> PathBuf {
        self.dir.join(RECIPE_FILE)
    }
}

/// All recipes found under one root directory.
#[derive(Debug, Clone, Default)]
pub struct RecipeDir {
    root: PathBuf,
    recipes: BTreeMap<PackageRef, RecipeSource>,
}

impl RecipeDir {
    /// Scan `root` for recipes.
    ///
    /// A missing root yields an empty set. Directories whose names are not
    /// valid package names or versions are skipped with a warning.
    pub fn scan(root: &Path) -> Result<Self> {
        let mut recipes = BTreeMap::new();

        if root.is_dir() {
            for path in glob_files(root, &format!("*/*/{}", RECIPE_FILE))? {
                let Some(dir) = path.parent() else { continue };
                let version = dir.file_name().map(|s| s.to_string_lossy().to_string());
                let name = dir
                    .parent()
                    .and_then(Path::file_name)
                    .map(|s| s.to_string_lossy().to_string());

                let (Some(name), Some(version)) = (name, version) else {
                    continue;
                };

                match PackageRef::new(name, version) {
                    Ok(package) => {
                        recipes.insert(
                            package.clone(),
                            RecipeSource {
                                package,
                                dir: dir.to_path_buf(),
                            },
                        );
                    }
                    Err(e) => warn!("ignoring recipe at {}: {}", dir.display(), e),
                }
            }
        }

        debug!("found {} recipe(s) in {}", recipes.len(), root.display());
        Ok(RecipeDir {
            root: root.to_path_buf(),
            recipes,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn get(&self, pkg: &PackageRef) -> Option<&RecipeSource> {
        self.recipes.get(pkg)
    }

    /// Every recipe, sorted by name then version string.
    pub fn sources(&self) -> impl Iterator<Item = &RecipeSource> {
        self.recipes.values()
    }

    /// Distinct package names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.recipes.keys().map(PackageRef::name).collect();
        names.dedup();
        names
    }

    /// Available versions of `name`, in natural order.
    pub fn versions(&self, name: &str) -> Vec<&str> {
        let mut versions = self.versions_of(name);
        version::sort_natural(&mut versions);
        versions
    }

    /// The latest available version of `name`.
    pub fn latest(&self, name: &str) -> Option<PackageRef> {
        let version = version::latest(self.versions_of(name))?;
        PackageRef::new(name, version).ok()
    }

    fn versions_of(&self, name: &str) -> Vec<&str> {
        self.recipes
            .keys()
            .filter(|p| p.name() == name)
            .map(PackageRef::version)
            .collect()
    }

    /// Turn seed specs into concrete packages, without duplicates.
    pub fn resolve_specs(&self, specs: &[PackageSpec]) -> Result<Vec<PackageRef>, ResolveError> {
        let mut seeds: Vec<PackageRef> = Vec::new();
        let mut push = |pkg: PackageRef| {
            if !seeds.contains(&pkg) {
                seeds.push(pkg);
            }
        };

        for spec in specs {
            match spec {
                PackageSpec::All => {
                    for name in self.names() {
                        if let Some(pkg) = self.latest(name) {
                            push(pkg);
                        }
                    }
                }
                PackageSpec::Latest(name) => {
                    let pkg = self
                        .latest(name)
                        .ok_or_else(|| ResolveError::RecipeNotFound {
                            package: name.clone(),
                            required_by: None,
                            available: Vec::new(),
                        })?;
                    push(pkg);
                }
                PackageSpec::Exact(pkg) => {
                    if self.get(pkg).is_none() {
                        return Err(ResolveError::RecipeNotFound {
                            package: pkg.to_string(),
                            required_by: None,
                            available: self
                                .versions(pkg.name())
                                .into_iter()
                                .map(str::to_string)
                                .collect(),
                        });
                    }
                    push(pkg.clone());
                }
            }
        }

        Ok(seeds)
    }
}

impl RecipeProvider for RecipeDir {
    fn available(&self) -> Vec<PackageRef> {
        self.recipes.keys().cloned().collect()
    }

    fn contains_name(&self, name: &str) -> bool {
        self.recipes.keys().any(|p| p.name() == name)
    }

    fn load(&self, pkg: &PackageRef) -> Result<Option<Box<dyn RecipeHandle>>, RecipeError> {
        match self.recipes.get(pkg) {
            Some(source) => {
                let recipe = LuaRecipe::load(&source.recipe_path())?;
                Ok(Some(Box::new(recipe)))
            }
            None => Ok(None),
        }
    }
}
