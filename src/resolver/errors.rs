//! Structural errors raised before any package is built.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::recipe::RecipeError;
use crate::util::diagnostic::Diagnostic;

/// Error during recipe discovery, graph construction or planning.
///
/// All of these are fatal: they abort the run before the external package
/// manager is invoked for anything.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ResolveError {
    #[error("no recipe found for package `{package}`")]
    #[diagnostic(code(foundry::resolve::recipe_not_found))]
    RecipeNotFound {
        package: String,
        /// The package whose recipe declared this one, if it was not a seed
        required_by: Option<String>,
        /// Versions of the same name that do have recipes
        available: Vec<String>,
    },

    #[error("failed to evaluate recipe for `{package}`")]
    #[diagnostic(code(foundry::resolve::recipe_evaluation))]
    RecipeEvaluation {
        package: String,
        #[source]
        source: RecipeError,
    },

    #[error("dependency cycle detected: {}", .cycle.join(" -> "))]
    #[diagnostic(code(foundry::resolve::cycle))]
    CyclicDependency { cycle: Vec<String> },

    #[error("conflicting recipe sources for `{package}`")]
    #[diagnostic(code(foundry::sources::conflict))]
    ConflictingSource {
        package: String,
        first: PathBuf,
        second: PathBuf,
    },
}

impl ResolveError {
    /// Record which package required a missing recipe.
    ///
    /// Only fills in the requirer when none has been recorded yet.
    pub fn required_by(self, requirer: Option<&impl ToString>) -> Self {
        match (self, requirer) {
            (
                ResolveError::RecipeNotFound {
                    package,
                    required_by: None,
                    available,
                },
                Some(requirer),
            ) => ResolveError::RecipeNotFound {
                package,
                required_by: Some(requirer.to_string()),
                available,
            },
            (err, _) => err,
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolveError::RecipeNotFound {
                package,
                required_by,
                available,
            } => {
                let mut diag =
                    Diagnostic::error(format!("could not find a recipe for `{}`", package));

                if let Some(requirer) = required_by {
                    diag = diag.with_context(format!("required by `{}`", requirer));
                }

                if !available.is_empty() {
                    diag = diag.with_context(format!(
                        "available versions: {}",
                        available.join(", ")
                    ));
                    diag = diag.with_suggestion(
                        "Request one of the available versions with NAME==VERSION".to_string(),
                    );
                }

                diag.with_suggestion(
                    "Add the directory containing the recipe with `--source <DIR>`".to_string(),
                )
            }

            ResolveError::RecipeEvaluation { package, source } => {
                let mut diag =
                    Diagnostic::error(format!("failed to evaluate recipe for `{}`", package))
                        .with_context(source.to_string())
                        .with_suggestion(
                            "Recipes must return a table with `requires` and/or `requirements`"
                                .to_string(),
                        );

                if let Some(path) = source.path() {
                    diag = diag.with_location(path);
                }
                diag
            }

            ResolveError::CyclicDependency { cycle } => {
                Diagnostic::error("cycle detected in dependency graph")
                    .with_context(format!("cycle: {}", cycle.join(" -> ")))
                    .with_context("each package requires the next".to_string())
                    .with_suggestion(
                        "Break the cycle by removing or restructuring requirements".to_string(),
                    )
            }

            ResolveError::ConflictingSource {
                package,
                first,
                second,
            } => Diagnostic::error(format!("conflicting recipe sources for `{}`", package))
                .with_context(format!("provided by {}", first.display()))
                .with_context(format!("and by {}", second.display()))
                .with_suggestion("Remove one copy of the recipe".to_string())
                .with_suggestion(
                    "Exclude a source with `--no-cwd` or `--no-cache`".to_string(),
                ),
        }
    }
}
