//! High-level operations.
//!
//! This module contains the implementation of Foundry commands.

pub mod foundry_build;
pub mod foundry_export;
pub mod foundry_plan;
pub mod recipes;

pub use foundry_build::{build, run_plan, BuildOptions, NOTHING_TO_BUILD};
pub use foundry_export::{export, ExportOptions};
pub use foundry_plan::{compute_plan, resolve_graph, PlanOptions, PlanOutcome};
pub use recipes::{collect_source_dirs, list_recipes, load_recipes, RecipeListing, SourceOptions};
