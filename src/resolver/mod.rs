//! Dependency discovery.
//!
//! Starting from the requested seed packages, recipes are evaluated one at a
//! time to discover what they require, producing a [`DependencyGraph`].
//! The graph is discarded after planning.

pub mod errors;
pub mod graph;
pub mod introspect;

pub use errors::ResolveError;
pub use graph::{DependencyGraph, DependencyGraphBuilder};
pub use introspect::RecipeIntrospector;
