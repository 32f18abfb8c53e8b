//! Package recipes and the narrow capability used to query them.
//!
//! A recipe may run arbitrary logic to decide what it requires, so the rest
//! of the crate never looks inside one: it only asks a [`RecipeHandle`] for
//! the raw requirement strings under a given [`IdentityContext`].

pub mod lua;

use thiserror::Error;

use crate::core::{Namespace, PackageRef, RefError};

pub use lua::LuaRecipe;

/// File name of a recipe inside `<root>/<name>/<version>/`.
pub const RECIPE_FILE: &str = "recipe.lua";

/// The identity a recipe is evaluated under.
///
/// Recipes see the same user/channel the packages will be built into, so
/// self-referential requirements (`"dep/1.0@" .. self.user .. "/" .. self.channel`)
/// resolve consistently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    pub user: String,
    pub channel: String,
    pub profile: String,
}

impl IdentityContext {
    pub fn new(namespace: &Namespace, profile: impl Into<String>) -> Self {
        IdentityContext {
            user: namespace.user().to_string(),
            channel: namespace.channel().to_string(),
            profile: profile.into(),
        }
    }
}

/// Error raised while loading or evaluating a recipe.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("failed to read recipe `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("recipe `{path}` must return a recipe table")]
    NotARecipe { path: String },

    #[error("recipe `{path}`: `requires` must be a string or a list of strings")]
    InvalidRequires { path: String },

    #[error("recipe `{path}` raised an error: {message}")]
    Lua { path: String, message: String },

    #[error("invalid requirement `{requirement}`: {source}")]
    InvalidRequirement {
        requirement: String,
        #[source]
        source: RefError,
    },
}

impl RecipeError {
    /// The recipe file the error points at, if any.
    pub fn path(&self) -> Option<&str> {
        match self {
            RecipeError::Io { path, .. }
            | RecipeError::NotARecipe { path }
            | RecipeError::InvalidRequires { path }
            | RecipeError::Lua { path, .. } => Some(path),
            RecipeError::InvalidRequirement { .. } => None,
        }
    }
}

/// A loaded recipe whose requirements can be evaluated.
pub trait RecipeHandle {
    /// Evaluate the recipe and return its raw declared requirements
    /// (`name/version@user/channel` strings), in declaration order.
    ///
    /// Every call must start from a fresh evaluation; nothing from a
    /// previous call may be observable.
    fn dependencies(&self, identity: &IdentityContext) -> Result<Vec<String>, RecipeError>;
}

/// A set of locally buildable recipes.
pub trait RecipeProvider {
    /// Every available package, sorted.
    fn available(&self) -> Vec<PackageRef>;

    /// Whether any version of `name` is available.
    fn contains_name(&self, name: &str) -> bool {
        self.available().iter().any(|p| p.name() == name)
    }

    /// Load the recipe for an exact name/version, `None` if there is none.
    fn load(&self, pkg: &PackageRef) -> Result<Option<Box<dyn RecipeHandle>>, RecipeError>;
}
