//! Slipway - a recipe evaluator and build-graph orchestrator for
//! native libraries
//!
//! This crate provides the core library functionality for Slipway,
//! including recipe evaluation, dependency resolution, build descriptor
//! generation and build orchestration.

pub mod build;
pub mod core;
pub mod generator;
pub mod layout;
pub mod ops;
pub mod registry;
pub mod resolver;
pub mod util;

/// Test fixtures for Slipway unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides builders for on-disk projects and
/// recipe registries.
#[cfg(test)]
pub mod test_support;

pub use core::{
    options::OptionValue, package_id::PackageId, recipe::Recipe, settings::Settings,
    snapshot::ConfigSnapshot, summary::RecipeSummary,
};

pub use layout::Layout;
pub use resolver::Resolution;
pub use util::context::GlobalContext;
