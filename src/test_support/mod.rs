//! Test utilities and mocks for Foundry unit tests.
//!
//! This module provides in-memory stand-ins for the two collaborators that
//! are awkward to exercise for real: recipe evaluation and the external
//! package manager.
//!
//! # Example
//!
//! ```rust,ignore
//! use foundry::test_support::{ns, pkg, MockPackageManager, StaticRecipes};
//!
//! #[test]
//! fn test_example() {
//!     let recipes = StaticRecipes::new()
//!         .recipe("libfoo/1.0", &["libbar/1.0@foundry/stable"])
//!         .recipe("libbar/1.0", &[]);
//!     let store = MockPackageManager::new().with_cached("libbar/1.0");
//!
//!     // Use mocks in tests...
//! }
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::builder::{Invocation, PackageManager};
use crate::core::{Namespace, PackageRef, QualifiedPackageRef};
use crate::recipe::{IdentityContext, RecipeError, RecipeHandle, RecipeProvider};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Parse a `name/version` reference.
pub fn pkg(s: &str) -> PackageRef {
    s.parse()
        .unwrap_or_else(|e| panic!("bad package reference `{s}`: {e}"))
}

/// The namespace used throughout the tests: `foundry/stable`.
pub fn ns() -> Namespace {
    Namespace::new("foundry", "stable").unwrap()
}

/// Recipes declared in memory, with a count of how often each was loaded.
#[derive(Debug, Default)]
pub struct StaticRecipes {
    /// `None` marks a recipe whose evaluation fails
    recipes: BTreeMap<PackageRef, Option<Vec<String>>>,
    loads: RefCell<HashMap<PackageRef, usize>>,
}

impl StaticRecipes {
    pub fn new() -> Self {
        StaticRecipes::default()
    }

    /// Add a recipe declaring `requires`, verbatim.
    pub fn recipe(mut self, package: &str, requires: &[&str]) -> Self {
        self.recipes.insert(
            pkg(package),
            Some(requires.iter().map(|r| r.to_string()).collect()),
        );
        self
    }

    /// Add a recipe that raises an error when evaluated.
    pub fn broken(mut self, package: &str) -> Self {
        self.recipes.insert(pkg(package), None);
        self
    }

    /// How many times the recipe for `package` was loaded.
    pub fn load_count(&self, package: &PackageRef) -> usize {
        self.loads.borrow().get(package).copied().unwrap_or(0)
    }
}

impl RecipeProvider for StaticRecipes {
    fn available(&self) -> Vec<PackageRef> {
        self.recipes.keys().cloned().collect()
    }

    fn load(&self, package: &PackageRef) -> Result<Option<Box<dyn RecipeHandle>>, RecipeError> {
        let Some(recipe) = self.recipes.get(package) else {
            return Ok(None);
        };

        *self.loads.borrow_mut().entry(package.clone()).or_insert(0) += 1;

        Ok(Some(Box::new(StaticRecipe {
            path: format!("{}/{}", package, crate::recipe::RECIPE_FILE),
            requires: recipe.clone(),
        })))
    }
}

struct StaticRecipe {
    path: String,
    requires: Option<Vec<String>>,
}

impl RecipeHandle for StaticRecipe {
    fn dependencies(&self, _identity: &IdentityContext) -> Result<Vec<String>, RecipeError> {
        self.requires.clone().ok_or_else(|| RecipeError::Lua {
            path: self.path.clone(),
            message: "scripted failure".to_string(),
        })
    }
}

/// A scripted package manager that records every call.
///
/// Calls are recorded as `"{step} {qualified}"`, e.g.
/// `"build libfoo/1.0@foundry/stable"`. Packages are named by their
/// `name/version` when scripting.
#[derive(Debug, Default)]
pub struct MockPackageManager {
    cached: BTreeSet<String>,
    failures: BTreeSet<(String, String)>,
    calls: Mutex<Vec<String>>,
}

impl MockPackageManager {
    pub fn new() -> Self {
        MockPackageManager::default()
    }

    /// Report `package` as already built.
    pub fn with_cached(mut self, package: &str) -> Self {
        self.cached.insert(package.to_string());
        self
    }

    pub fn fail_search(self, package: &str) -> Self {
        self.fail("search", package)
    }

    pub fn fail_build(self, package: &str) -> Self {
        self.fail("build", package)
    }

    pub fn fail_upload(self, package: &str) -> Self {
        self.fail("upload", package)
    }

    pub fn fail_export(self, package: &str) -> Self {
        self.fail("export", package)
    }

    fn fail(mut self, step: &str, package: &str) -> Self {
        self.failures.insert((step.to_string(), package.to_string()));
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, step: &str, package: &QualifiedPackageRef) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} {}", step, package));

        let key = (step.to_string(), package.package().to_string());
        if self.failures.contains(&key) {
            bail!("scripted failure: {} {}", step, package);
        }
        Ok(())
    }
}

impl PackageManager for MockPackageManager {
    fn invoke(&self, package: &QualifiedPackageRef, invocation: &Invocation<'_>) -> Result<()> {
        self.record(invocation.step(), package)
    }

    fn describe(&self, package: &QualifiedPackageRef, invocation: &Invocation<'_>) -> String {
        format!("mock {} {}", invocation.step(), package)
    }

    fn search(&self, package: &QualifiedPackageRef) -> Result<bool> {
        self.record("search", package)?;
        Ok(self.cached.contains(&package.package().to_string()))
    }
}
