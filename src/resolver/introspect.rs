//! Extracting in-scope dependencies from recipes.

use tracing::debug;

use crate::core::{Namespace, PackageRef, Requirement};
use crate::recipe::{IdentityContext, RecipeError, RecipeProvider};
use crate::resolver::errors::ResolveError;

/// Answers "what does this package depend on?" for graph construction.
///
/// Only requirements that live in the current namespace and name a locally
/// available recipe are reported. Everything else is assumed to be
/// supplied from outside (already built, or fetched from a remote).
pub struct RecipeIntrospector<'a> {
    provider: &'a dyn RecipeProvider,
    namespace: Namespace,
    identity: IdentityContext,
}

impl<'a> RecipeIntrospector<'a> {
    pub fn new(provider: &'a dyn RecipeProvider, namespace: Namespace, profile: &str) -> Self {
        let identity = IdentityContext::new(&namespace, profile);
        RecipeIntrospector {
            provider,
            namespace,
            identity,
        }
    }

    /// Evaluate the recipe for `pkg` and return its in-scope dependencies,
    /// in declaration order and without duplicates.
    pub fn dependencies_of(&self, pkg: &PackageRef) -> Result<Vec<PackageRef>, ResolveError> {
        let handle = self
            .provider
            .load(pkg)
            .map_err(|source| ResolveError::RecipeEvaluation {
                package: pkg.to_string(),
                source,
            })?
            .ok_or_else(|| self.not_found(pkg))?;

        let raw = handle
            .dependencies(&self.identity)
            .map_err(|source| ResolveError::RecipeEvaluation {
                package: pkg.to_string(),
                source,
            })?;

        let mut deps: Vec<PackageRef> = Vec::new();
        for requirement in raw {
            if !Requirement::claims(&requirement, &self.namespace) {
                debug!("{}: `{}` is outside {}, skipping", pkg, requirement, self.namespace);
                continue;
            }

            let parsed: Requirement =
                requirement
                    .parse()
                    .map_err(|source| ResolveError::RecipeEvaluation {
                        package: pkg.to_string(),
                        source: RecipeError::InvalidRequirement {
                            requirement: requirement.clone(),
                            source,
                        },
                    })?;

            if !self.provider.contains_name(parsed.package.name()) {
                debug!("{}: `{}` has no local recipe, skipping", pkg, requirement);
                continue;
            }

            if !deps.contains(&parsed.package) {
                deps.push(parsed.package);
            }
        }

        Ok(deps)
    }

    fn not_found(&self, pkg: &PackageRef) -> ResolveError {
        let available = self
            .provider
            .available()
            .into_iter()
            .filter(|p| p.name() == pkg.name())
            .map(|p| p.version().to_string())
            .collect();

        ResolveError::RecipeNotFound {
            package: pkg.to_string(),
            required_by: None,
            available,
        }
    }
}
