//! Implementation of `foundry build`.

use std::sync::Arc;

use anyhow::Result;

use crate::builder::{
    BuildEvent, BuildExecutor, ConanCli, ExecutionReport, ExecutorOptions, PackageManager,
};
use crate::ops::foundry_plan::{compute_plan, PlanOptions, PlanOutcome};
use crate::util::shell::{Shell, Status};
use crate::util::GlobalContext;

/// Message printed when every requested package is already built.
pub const NOTHING_TO_BUILD: &str =
    "No packages need to be built. Use --rebuild to rebuild existing packages.";

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// What to build and where recipes come from
    pub plan: PlanOptions,

    /// Print the package-manager commands instead of running them
    pub dry_run: bool,

    /// Options forwarded to every build (`PKG:OPTION=VALUE`)
    pub build_options: Vec<String>,

    /// Upload built packages to this remote
    pub upload_remote: Option<String>,
}

/// Plan the requested packages, then build (and upload) them in order.
pub fn build(ctx: &GlobalContext, opts: &BuildOptions, shell: &Arc<Shell>) -> Result<ExecutionReport> {
    shell.status(Status::Resolving, "dependencies");
    let outcome = compute_plan(ctx, &opts.plan)?;

    let manager = ConanCli::new(opts.plan.manager_program.clone(), outcome.recipes.root());
    run_plan(&outcome, &manager, opts, shell)
}

/// Execute a computed plan with the given package manager.
pub fn run_plan(
    outcome: &PlanOutcome,
    manager: &dyn PackageManager,
    opts: &BuildOptions,
    shell: &Arc<Shell>,
) -> Result<ExecutionReport> {
    let plan = &outcome.plan;

    for pkg in &plan.cached {
        shell.status(Status::Fresh, pkg.qualify(&plan.namespace));
    }

    if plan.is_empty() {
        shell.note(NOTHING_TO_BUILD);
        return Ok(ExecutionReport::default());
    }

    announce(plan.qualified().iter().map(ToString::to_string), opts, shell);
    shell.json_event(
        &BuildEvent::Plan {
            packages: plan.qualified().iter().map(ToString::to_string).collect(),
            cached: plan
                .cached
                .iter()
                .map(|p| p.qualify(&plan.namespace).to_string())
                .collect(),
            upload_remote: opts.upload_remote.clone(),
        }
        .to_value(),
    );

    let executor = BuildExecutor::new(
        manager,
        Arc::clone(shell),
        ExecutorOptions {
            dry_run: opts.dry_run,
            profile: opts.plan.profile.clone(),
            build_options: opts.build_options.clone(),
            upload_remote: opts.upload_remote.clone(),
        },
    );
    let report = executor.run(plan)?;

    let summary = match report.uploaded.len() {
        0 => format!("{} package(s)", report.built.len()),
        n => format!("{} package(s), uploaded {}", report.built.len(), n),
    };
    if opts.dry_run {
        shell.status(Status::Finished, format!("dry run of {}", summary));
    } else {
        shell.status(Status::Finished, summary);
    }

    Ok(report)
}

fn announce(packages: impl Iterator<Item = String>, opts: &BuildOptions, shell: &Shell) {
    let header = match &opts.upload_remote {
        Some(remote) => format!(
            "The following packages will be built and uploaded to the remote {}:",
            remote
        ),
        None => "The following packages will be built:".to_string(),
    };
    shell.note(header);
    for pkg in packages {
        shell.detail(pkg);
    }
}
