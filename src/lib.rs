//! Foundry - build native-library packages in dependency order
//!
//! This crate provides the core library functionality for Foundry:
//! discovering package dependencies from Lua recipes, ordering builds,
//! and driving an external package manager.

pub mod builder;
pub mod core;
pub mod ops;
pub mod recipe;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and mocks for Foundry unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides in-memory recipe providers, a scripted
/// package manager and on-disk recipe fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{Namespace, PackageRef, PackageSpec, QualifiedPackageRef};
pub use resolver::{DependencyGraph, ResolveError};
pub use util::context::GlobalContext;
