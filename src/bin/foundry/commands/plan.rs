//! `foundry plan` command
//!
//! Prints the qualified packages that `foundry build` would build, in
//! order, one per line on stdout.

use std::sync::Arc;

use anyhow::Result;

use crate::cli::PlanArgs;
use crate::commands::{manager_program, namespace, profile, source_options};
use foundry::builder::{BuildEvent, GraphEdge};
use foundry::ops::{compute_plan, PlanOptions, NOTHING_TO_BUILD};
use foundry::util::shell::Status;
use foundry::util::{GlobalContext, Shell};

pub fn execute(args: PlanArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = ctx.config();

    let opts = PlanOptions {
        specs: args.packages,
        sources: source_options(&args.sources, &config),
        namespace: namespace(&args.namespace, &config)?,
        profile: profile(&args.namespace, &config),
        force_rebuild_all: args.rebuild,
        manager_program: manager_program(&args.namespace, &config),
    };

    shell.status(Status::Resolving, "dependencies");
    let outcome = compute_plan(&ctx, &opts)?;
    let plan = &outcome.plan;
    let namespace = &plan.namespace;

    let edges: Vec<GraphEdge> = outcome
        .graph
        .edges()
        .into_iter()
        .map(|(dependency, dependent)| GraphEdge {
            dependency: dependency.qualify(namespace).to_string(),
            dependent: dependent.qualify(namespace).to_string(),
        })
        .collect();

    if shell.is_json() {
        shell.json_event(
            &BuildEvent::Plan {
                packages: plan.qualified().iter().map(ToString::to_string).collect(),
                cached: plan
                    .cached
                    .iter()
                    .map(|p| p.qualify(namespace).to_string())
                    .collect(),
                upload_remote: None,
            }
            .to_value(),
        );
        if args.graph {
            shell.json_event(&BuildEvent::Graph { edges }.to_value());
        }
        return Ok(());
    }

    for pkg in &plan.cached {
        shell.status(Status::Fresh, pkg.qualify(namespace));
    }

    if plan.is_empty() {
        shell.note(NOTHING_TO_BUILD);
    }

    for pkg in plan.qualified() {
        shell.print(pkg);
    }

    if args.graph {
        shell.print("");
        for edge in &edges {
            shell.print(format!("{} -> {}", edge.dependency, edge.dependent));
        }
    }

    Ok(())
}
