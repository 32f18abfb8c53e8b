//! Planning and running package builds.
//!
//! This module decides what needs building and in what order, then drives
//! the external package manager one package at a time.

pub mod cache;
pub mod events;
pub mod executor;
pub mod manager;
pub mod plan;

pub use cache::{NoCache, PackageCache, StoreCache};
pub use events::{BuildEvent, GraphEdge};
pub use executor::{BuildError, BuildExecutor, ExecutionReport, ExecutorOptions};
pub use manager::{ConanCli, Invocation, PackageManager};
pub use plan::{BuildOrderPlanner, BuildPlan};
