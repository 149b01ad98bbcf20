//! Requirement specification.
//!
//! A Requirement describes what a recipe needs from another package: a name,
//! a semver range and whether the dependency is consumed by the package
//! itself or only by its test suite.

use std::fmt;

use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

/// Whether a requirement belongs to the package or only to its tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementKind {
    /// Linked into the package itself.
    Regular,
    /// Needed only to build and run the package's tests.
    Test,
}

/// A dependency requirement of one recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    name: String,
    version_req: VersionReq,
    kind: RequirementKind,
}

impl Requirement {
    /// Create a regular requirement.
    pub fn new(name: impl Into<String>, version_req: VersionReq) -> Self {
        Requirement {
            name: name.into(),
            version_req,
            kind: RequirementKind::Regular,
        }
    }

    /// Create a test-only requirement.
    pub fn test(name: impl Into<String>, version_req: VersionReq) -> Self {
        Requirement {
            name: name.into(),
            version_req,
            kind: RequirementKind::Test,
        }
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the version requirement.
    pub fn version_req(&self) -> &VersionReq {
        &self.version_req
    }

    /// Get the requirement kind.
    pub fn kind(&self) -> RequirementKind {
        self.kind
    }

    /// Check if this requirement is test-only.
    pub fn is_test(&self) -> bool {
        self.kind == RequirementKind::Test
    }

    /// Check if a version satisfies this requirement.
    pub fn matches_version(&self, version: &Version) -> bool {
        self.version_req.matches(version)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version_req)
    }
}

/// Requirement specification as it appears in Slipway.toml.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequirementSpec {
    /// Simple version string: `chesscore = "^1.0"`
    Simple(String),

    /// Detailed specification: `chesscore = { version = "^1.0" }`
    Detailed { version: String },
}

impl RequirementSpec {
    /// Get the raw version requirement string.
    pub fn version(&self) -> &str {
        match self {
            RequirementSpec::Simple(v) => v,
            RequirementSpec::Detailed { version } => version,
        }
    }

    /// Parse the version requirement.
    pub fn version_req(&self) -> Result<VersionReq, semver::Error> {
        self.version().parse()
    }
}
