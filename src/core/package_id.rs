//! Package identification - WHAT package (name + resolved version).

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

/// A unique identifier for a resolved package.
///
/// Ordering is by name, then version, so sorted collections of ids are
/// stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageId {
    name: String,
    version: Version,
}

impl PackageId {
    /// Create a new package ID.
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        PackageId {
            name: name.into(),
            version,
        }
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the package version.
    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_id_equality() {
        let id1 = PackageId::new("chesscore", Version::new(1, 0, 0));
        let id2 = PackageId::new("chesscore", Version::new(1, 0, 0));
        let id3 = PackageId::new("chesscore", Version::new(2, 0, 0));

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
    }

    #[test]
    fn test_package_id_ordering() {
        let a1 = PackageId::new("aaa", Version::new(1, 0, 0));
        let a2 = PackageId::new("aaa", Version::new(2, 0, 0));
        let b1 = PackageId::new("bbb", Version::new(1, 0, 0));

        assert!(a1 < a2);
        assert!(a2 < b1);
    }

    #[test]
    fn test_display() {
        let id = PackageId::new("catch2", Version::new(3, 7, 1));
        assert_eq!(id.to_string(), "catch2/3.7.1");
    }
}
