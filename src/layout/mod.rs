//! Filesystem layout for one configuration of one package.
//!
//! Every path the tool writes is derived here, from the package root and
//! the frozen configuration snapshot. The scheme is stable so other tools
//! can locate generated files:
//!
//! ```text
//! <root>/
//!   build/<buildtype>-<fp8>/        build tree for one configuration
//!     generators/                   descriptor files consumed by the build tool
//!       slipway_toolchain.cmake
//!       <dep>-<buildtype>.cmake     one per regular dependency
//!       test/
//!         <dep>-<buildtype>.cmake   one per test-only dependency
//!     test-deps/<name>/             isolated test-dependency build trees
//!     package/                      packaged artifacts
//!     .slipway/state.json           orchestrator state
//! ```
//!
//! `<buildtype>` is the lowercased `build_type` setting (`default` when the
//! axis is unset) and `<fp8>` is the first eight hex characters of the
//! snapshot fingerprint. Any change to a setting or option value changes
//! `<fp8>`, so two configurations never share a build tree, while identical
//! snapshots always map back to the same one.

use std::path::{Path, PathBuf};

use crate::core::ConfigSnapshot;

/// Paths for one (package root, configuration) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    source_dir: PathBuf,
    build_dir: PathBuf,
    generators_dir: PathBuf,
    package_dir: PathBuf,
}

impl Layout {
    /// Compute the layout for a package root under a frozen snapshot.
    pub fn new(root: &Path, snapshot: &ConfigSnapshot) -> Self {
        let build_type = snapshot
            .build_type()
            .unwrap_or("default")
            .to_lowercase();
        let build_dir = root
            .join("build")
            .join(format!("{}-{}", build_type, snapshot.fingerprint_short()));
        let generators_dir = build_dir.join("generators");
        let package_dir = build_dir.join("package");

        Layout {
            source_dir: root.to_path_buf(),
            build_dir,
            generators_dir,
            package_dir,
        }
    }

    /// The package root, where sources and the recipe live.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// The build tree for this configuration.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Where descriptor files are written.
    pub fn generators_dir(&self) -> &Path {
        &self.generators_dir
    }

    /// Where test-only dependency descriptors are written.
    pub fn test_generators_dir(&self) -> PathBuf {
        self.generators_dir.join("test")
    }

    /// Where packaged artifacts are collected.
    pub fn package_dir(&self) -> &Path {
        &self.package_dir
    }

    /// The isolated build tree for one test-only dependency.
    pub fn test_dep_build_dir(&self, name: &str) -> PathBuf {
        self.build_dir.join("test-deps").join(name)
    }

    /// Directory holding orchestrator state for this configuration.
    pub fn state_dir(&self) -> PathBuf {
        self.build_dir.join(".slipway")
    }
}
