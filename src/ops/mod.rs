//! High-level operations.
//!
//! This module contains the implementation of Slipway commands.

pub mod resolve;
pub mod slipway_build;
pub mod slipway_configure;
pub mod slipway_package;

pub use resolve::{resolve_project, EvalOptions, Evaluated};
pub use slipway_build::{build, BuildOptions, BuildResult};
pub use slipway_configure::{configure, ConfigureResult};
pub use slipway_package::{package, PackageOptions, PackageResult};
