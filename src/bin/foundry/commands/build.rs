//! `foundry build` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::commands::{manager_program, namespace, profile, source_options};
use foundry::ops::foundry_build::{build, BuildOptions};
use foundry::ops::PlanOptions;
use foundry::util::{GlobalContext, Shell};

pub fn execute(args: BuildArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = ctx.config();

    // Options given on the command line replace the configured ones
    let build_options = if args.options.is_empty() {
        config.build.options.clone()
    } else {
        args.options
    };

    let opts = BuildOptions {
        plan: PlanOptions {
            specs: args.packages,
            sources: source_options(&args.sources, &config),
            namespace: namespace(&args.namespace, &config)?,
            profile: profile(&args.namespace, &config),
            force_rebuild_all: args.rebuild,
            manager_program: manager_program(&args.namespace, &config),
        },
        dry_run: args.dry_run,
        build_options,
        upload_remote: args.upload.or(config.build.remote.clone()),
    };

    build(&ctx, &opts, shell)?;
    Ok(())
}
