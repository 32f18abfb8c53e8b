//! Implementation of `foundry export`.

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::builder::{BuildExecutor, ConanCli, ExecutionReport, ExecutorOptions, PackageManager};
use crate::core::{Namespace, PackageRef, QualifiedPackageRef};
use crate::ops::recipes::{load_recipes, SourceOptions};
use crate::sources::RecipeDir;
use crate::util::diagnostic::suggestions;
use crate::util::shell::{Shell, Status};
use crate::util::GlobalContext;

/// Options for the export command.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Where recipes are collected from
    pub sources: SourceOptions,

    /// User/channel recipes are exported into
    pub namespace: Namespace,

    /// Print the package-manager commands instead of running them
    pub dry_run: bool,

    /// The package-manager executable
    pub manager_program: String,
}

/// Export every available recipe into the package manager's store.
pub fn export(ctx: &GlobalContext, opts: &ExportOptions, shell: &Arc<Shell>) -> Result<ExecutionReport> {
    let recipes = load_recipes(ctx, &opts.sources)?;
    if recipes.recipes().is_empty() {
        bail!("no recipes found\nhint: {}", suggestions::NO_RECIPES);
    }

    let manager = ConanCli::new(opts.manager_program.clone(), recipes.root());
    export_with(recipes.recipes(), &manager, opts, shell)
}

/// Export the recipes in `recipes`, in name then version order.
pub fn export_with(
    recipes: &RecipeDir,
    manager: &dyn PackageManager,
    opts: &ExportOptions,
    shell: &Arc<Shell>,
) -> Result<ExecutionReport> {
    let packages: Vec<QualifiedPackageRef> = recipes
        .names()
        .into_iter()
        .flat_map(|name| {
            recipes
                .versions(name)
                .into_iter()
                .filter_map(move |version| PackageRef::new(name, version).ok())
        })
        .map(|pkg| pkg.qualify(&opts.namespace))
        .collect();

    let executor = BuildExecutor::new(
        manager,
        Arc::clone(shell),
        ExecutorOptions {
            dry_run: opts.dry_run,
            profile: String::new(),
            build_options: Vec::new(),
            upload_remote: None,
        },
    );
    let report = executor.export(&packages)?;

    shell.status(
        Status::Finished,
        format!("exported {} recipe(s)", report.exported.len()),
    );
    Ok(report)
}
