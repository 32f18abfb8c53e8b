//! Implementation of `foundry plan`, and the planning half of `foundry build`.

use anyhow::{bail, Result};
use tracing::debug;

use crate::builder::{BuildOrderPlanner, BuildPlan, ConanCli, NoCache, PackageCache, StoreCache};
use crate::core::{Namespace, PackageSpec};
use crate::ops::recipes::{load_recipes, SourceOptions};
use crate::resolver::{DependencyGraph, DependencyGraphBuilder, RecipeIntrospector, ResolveError};
use crate::sources::{AggregatedRecipes, RecipeDir};
use crate::util::diagnostic::suggestions;
use crate::util::GlobalContext;

/// Options for computing a build plan.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Requested packages
    pub specs: Vec<PackageSpec>,

    /// Where recipes are collected from
    pub sources: SourceOptions,

    /// User/channel every package is built into
    pub namespace: Namespace,

    /// Package-manager profile, visible to recipes
    pub profile: String,

    /// Plan every package even if already built
    pub force_rebuild_all: bool,

    /// The package-manager executable
    pub manager_program: String,
}

/// Everything planning produced.
///
/// The aggregated recipes are kept alive because building reads the recipe
/// files from the same temporary root.
#[derive(Debug)]
pub struct PlanOutcome {
    pub recipes: AggregatedRecipes,
    pub graph: DependencyGraph,
    pub plan: BuildPlan,
}

/// Build the dependency graph of the requested packages.
pub fn resolve_graph(
    recipes: &RecipeDir,
    specs: &[PackageSpec],
    namespace: &Namespace,
    profile: &str,
) -> Result<DependencyGraph, ResolveError> {
    let seeds = recipes.resolve_specs(specs)?;
    debug!(
        "seed packages: {}",
        seeds.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    );

    let introspector = RecipeIntrospector::new(recipes, namespace.clone(), profile);
    DependencyGraphBuilder::new(&introspector).build(&seeds)
}

/// Aggregate recipes, build the graph and order it.
///
/// Unless a full rebuild is requested, the package manager's store is
/// searched once per package to skip already-built ones.
pub fn compute_plan(ctx: &GlobalContext, opts: &PlanOptions) -> Result<PlanOutcome> {
    if opts.specs.is_empty() {
        bail!("no packages specified\nhint: name packages to build, or use `all`");
    }

    let recipes = load_recipes(ctx, &opts.sources)?;
    if recipes.recipes().is_empty() {
        bail!("no recipes found\nhint: {}", suggestions::NO_RECIPES);
    }

    let graph = resolve_graph(
        recipes.recipes(),
        &opts.specs,
        &opts.namespace,
        &opts.profile,
    )?;

    let manager = ConanCli::new(opts.manager_program.clone(), recipes.root());
    let store_cache = StoreCache::new(&manager);
    let cache: &dyn PackageCache = if opts.force_rebuild_all {
        &NoCache
    } else {
        &store_cache
    };

    let plan = BuildOrderPlanner::new(cache, opts.namespace.clone())
        .plan(&graph, opts.force_rebuild_all)?;

    Ok(PlanOutcome {
        recipes,
        graph,
        plan,
    })
}
