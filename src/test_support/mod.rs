//! Test utilities for Slipway unit and integration tests.
//!
//! Provides fixture builders for on-disk projects and registries so
//! tests can set up realistic trees without repeating boilerplate.
//!
//! # Example
//!
//! ```rust,ignore
//! use slipway::test_support::{ProjectFixture, RegistryFixture};
//!
//! let registry = RegistryFixture::new()
//!     .with_package("chesscore", "1.0.0")
//!     .write_to(tmp.path())?;
//! let project = ProjectFixture::application("app")
//!     .with_config(&registry, "true")
//!     .write_to(tmp.path())?;
//! ```

pub mod fixtures;

pub use fixtures::*;
