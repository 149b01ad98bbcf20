//! Recipe registries - where dependency recipes come from.
//!
//! A registry maps a package name and version requirement to recipe
//! summaries. The directory-backed registry is the only shipped
//! implementation; the trait is the seam tests fake.

pub mod dir;

pub use dir::DirRegistry;

use std::path::PathBuf;

use semver::{Version, VersionReq};
use thiserror::Error;

use crate::core::RecipeSummary;

/// Error while querying a registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("package `{package}` not found in registry `{}`", registry.display())]
    PackageNotFound { package: String, registry: PathBuf },

    #[error("registry entry `{package}/{version}` is invalid: {reason}")]
    InvalidEntry {
        package: String,
        version: String,
        reason: String,
    },

    #[error("failed to read registry at `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A source of dependency recipes.
pub trait Registry {
    /// Get the registry name for display.
    fn name(&self) -> String;

    /// Query versions matching a requirement, sorted highest first.
    ///
    /// An unknown package name is an error; a known name with no matching
    /// version returns an empty list.
    fn query(&self, name: &str, req: &VersionReq) -> Result<Vec<RecipeSummary>, RegistryError>;

    /// List every available version of a package, sorted highest first.
    fn all_versions(&self, name: &str) -> Result<Vec<Version>, RegistryError>;
}
