//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell as CompletionShell;

use foundry::core::PackageSpec;
use foundry::util::shell::ColorChoice;

/// Foundry - build native-library packages in dependency order
#[derive(Parser)]
#[command(name = "foundry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Coloring: auto, always, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    /// Print machine-readable JSON events on stdout
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build packages and their in-scope dependencies
    Build(BuildArgs),

    /// Show the build order without building anything
    Plan(PlanArgs),

    /// Export every available recipe into the package store
    Export(ExportArgs),

    /// List available recipes
    List(ListArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where recipes are collected from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Additional recipe source directory (repeatable)
    #[arg(short = 's', long = "source", value_name = "DIR")]
    pub sources: Vec<PathBuf>,

    /// Don't look for recipes in the working directory
    #[arg(long)]
    pub no_cwd: bool,

    /// Don't look for recipes in the recipe cache
    #[arg(long)]
    pub no_cache: bool,
}

/// The build namespace and the package manager driving it.
#[derive(Args, Debug, Clone)]
pub struct NamespaceArgs {
    /// User packages are built for
    #[arg(long, env = "FOUNDRY_USER")]
    pub user: Option<String>,

    /// Channel packages are built for
    #[arg(long, env = "FOUNDRY_CHANNEL")]
    pub channel: Option<String>,

    /// Package-manager profile
    #[arg(long, env = "FOUNDRY_PROFILE")]
    pub profile: Option<String>,

    /// Package-manager executable
    #[arg(long, value_name = "PROGRAM", env = "FOUNDRY_MANAGER")]
    pub manager: Option<String>,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Packages to build: NAME, NAME==VERSION, NAME/VERSION, or `all`
    #[arg(required = true, value_name = "PACKAGE")]
    pub packages: Vec<PackageSpec>,

    /// Rebuild packages even if they are already built
    #[arg(long)]
    pub rebuild: bool,

    /// Print the package-manager commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Build option forwarded to every build, `PKG:OPTION=VALUE` (repeatable)
    #[arg(short = 'o', long = "option", value_name = "OPTION")]
    pub options: Vec<String>,

    /// Upload built packages to this remote
    #[arg(long, value_name = "REMOTE")]
    pub upload: Option<String>,

    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(flatten)]
    pub namespace: NamespaceArgs,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Packages to plan: NAME, NAME==VERSION, NAME/VERSION, or `all`
    #[arg(required = true, value_name = "PACKAGE")]
    pub packages: Vec<PackageSpec>,

    /// Plan packages even if they are already built
    #[arg(long)]
    pub rebuild: bool,

    /// Also print the dependency edges
    #[arg(long)]
    pub graph: bool,

    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(flatten)]
    pub namespace: NamespaceArgs,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Print the package-manager commands instead of running them
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub sources: SourceArgs,

    #[command(flatten)]
    pub namespace: NamespaceArgs,
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub sources: SourceArgs,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
