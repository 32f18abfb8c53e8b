//! Core data structures for Foundry.
//!
//! - Package references (plain and user/channel qualified)
//! - Seed package specifications
//! - Natural version ordering

pub mod package_ref;
pub mod version;

pub use package_ref::{
    Namespace, PackageRef, PackageSpec, QualifiedPackageRef, RefError, Requirement,
};
