//! Foundry CLI - build native-library packages in dependency order

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use foundry::builder::BuildError;
use foundry::resolver::ResolveError;
use foundry::util::diagnostic::emit;
use foundry::util::Shell;

fn main() {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("foundry=debug")
    } else {
        EnvFilter::new("foundry=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let shell = Arc::new(Shell::from_flags(cli.quiet, cli.verbose, cli.color, cli.json));

    if let Err(e) = run(cli.command, &shell) {
        report(&e, &shell);
        std::process::exit(1);
    }
}

fn run(command: Commands, shell: &Arc<Shell>) -> Result<()> {
    match command {
        Commands::Build(args) => commands::build::execute(args, shell),
        Commands::Plan(args) => commands::plan::execute(args, shell),
        Commands::Export(args) => commands::export::execute(args, shell),
        Commands::List(args) => commands::list::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// Print a failed command's error, with a full diagnostic for the errors
/// that have one.
fn report(err: &anyhow::Error, shell: &Shell) {
    if shell.is_json() {
        shell.error(format!("{:#}", err));
        return;
    }

    let diagnostic = err.chain().find_map(|cause| {
        cause
            .downcast_ref::<ResolveError>()
            .map(ResolveError::to_diagnostic)
            .or_else(|| cause.downcast_ref::<BuildError>().map(BuildError::to_diagnostic))
    });

    match diagnostic {
        Some(diagnostic) => emit(&diagnostic, shell.use_color()),
        None => eprintln!("error: {:#}", err),
    }
}
