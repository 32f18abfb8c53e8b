//! `foundry export` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::ExportArgs;
use crate::commands::{manager_program, namespace, source_options};
use foundry::ops::{export, ExportOptions};
use foundry::util::{GlobalContext, Shell};

pub fn execute(args: ExportArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = ctx.config();

    let opts = ExportOptions {
        sources: source_options(&args.sources, &config),
        namespace: namespace(&args.namespace, &config)?,
        dry_run: args.dry_run,
        manager_program: manager_program(&args.namespace, &config),
    };

    export(&ctx, &opts, shell)?;
    Ok(())
}
