//! `foundry list` command

use std::sync::Arc;

use anyhow::Result;

use crate::cli::ListArgs;
use crate::commands::source_options;
use foundry::ops::list_recipes;
use foundry::util::diagnostic::{emit, suggestions, Diagnostic};
use foundry::util::{GlobalContext, Shell};

pub fn execute(args: ListArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let config = ctx.config();

    let listings = list_recipes(&ctx, &source_options(&args.sources, &config))?;

    if shell.is_json() {
        shell.json_event(&serde_json::json!({
            "reason": "recipe-list",
            "recipes": listings,
        }));
        return Ok(());
    }

    if listings.is_empty() {
        if !shell.is_quiet() {
            let diagnostic =
                Diagnostic::warning("no recipes found").with_suggestion(suggestions::NO_RECIPES);
            emit(&diagnostic, shell.use_color());
        }
        return Ok(());
    }

    for listing in &listings {
        shell.print(&listing.name);
        for version in &listing.versions {
            if *version == listing.latest {
                shell.print(format!("    {} (latest)", version));
            } else {
                shell.print(format!("    {}", version));
            }
        }
    }

    Ok(())
}
