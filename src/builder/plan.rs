//! Build order planning.
//!
//! A BuildPlan lists the packages to build, dependencies first. Packages
//! that already have a built artifact are left out unless a full rebuild is
//! requested, without disturbing the relative order of the rest.

use serde::Serialize;
use tracing::debug;

use crate::builder::cache::PackageCache;
use crate::core::{Namespace, PackageRef, QualifiedPackageRef};
use crate::resolver::{DependencyGraph, ResolveError};

/// An ordered list of packages to build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    /// Namespace every package is built into
    pub namespace: Namespace,

    /// Packages to build, in build order
    pub packages: Vec<PackageRef>,

    /// Packages skipped because they are already built, in build order
    pub cached: Vec<PackageRef>,
}

impl BuildPlan {
    /// The packages to build, qualified with the plan's namespace.
    pub fn qualified(&self) -> Vec<QualifiedPackageRef> {
        self.packages
            .iter()
            .map(|p| p.qualify(&self.namespace))
            .collect()
    }

    /// An empty plan means there is nothing to do.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }
}

/// Turns a dependency graph into a build plan.
pub struct BuildOrderPlanner<'a> {
    cache: &'a dyn PackageCache,
    namespace: Namespace,
}

impl<'a> BuildOrderPlanner<'a> {
    pub fn new(cache: &'a dyn PackageCache, namespace: Namespace) -> Self {
        BuildOrderPlanner { cache, namespace }
    }

    /// Order the graph and drop already-built packages.
    ///
    /// With `force_rebuild_all` the cache is never consulted. Otherwise it
    /// is queried once per package.
    pub fn plan(
        &self,
        graph: &DependencyGraph,
        force_rebuild_all: bool,
    ) -> Result<BuildPlan, ResolveError> {
        let order = graph.topological_order()?;

        let (packages, cached) = if force_rebuild_all {
            (order, Vec::new())
        } else {
            order
                .into_iter()
                .partition(|pkg| !self.cache.has_built_artifact(&pkg.qualify(&self.namespace)))
        };

        for pkg in &cached {
            debug!("{} is already built", pkg.qualify(&self.namespace));
        }

        Ok(BuildPlan {
            namespace: self.namespace.clone(),
            packages,
            cached,
        })
    }
}
