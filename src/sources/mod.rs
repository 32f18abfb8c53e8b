//! Recipe sources.
//!
//! Recipes are discovered by scanning directories laid out as
//! `<root>/<name>/<version>/recipe.lua`. Several source directories can be
//! merged into one temporary root before building.

pub mod aggregate;
pub mod recipe_dir;

pub use aggregate::AggregatedRecipes;
pub use recipe_dir::{RecipeDir, RecipeSource};
