//! Directory-backed recipe registry.
//!
//! Layout on disk:
//!
//! ```text
//! <root>/
//!   chesscore/
//!     1.0.0/
//!       Slipway.toml
//!       include/          public headers
//!       lib/              prebuilt libraries
//!         Release/        optional per-build-type variant
//!       CMakeLists.txt    present when the entry builds from source
//! ```
//!
//! When a `lib/<BuildType>` subdirectory exists for the configured build
//! type it is preferred over plain `lib/`.

use std::path::{Path, PathBuf};

use semver::{Version, VersionReq};
use walkdir::WalkDir;

use crate::core::recipe::RECIPE_FILE_NAME;
use crate::core::{ArtifactDirs, Recipe, RecipeSummary};
use crate::registry::{Registry, RegistryError};

/// A registry rooted at a local directory.
#[derive(Debug, Clone)]
pub struct DirRegistry {
    root: PathBuf,

    /// Build type used to narrow `lib/` to a per-build-type variant
    build_type: Option<String>,
}

impl DirRegistry {
    /// Create a registry over a root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirRegistry {
            root: root.into(),
            build_type: None,
        }
    }

    /// Narrow library lookups to a build type.
    pub fn with_build_type(mut self, build_type: impl Into<String>) -> Self {
        self.build_type = Some(build_type.into());
        self
    }

    /// Get the registry root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan `<root>/<name>/` for version directories, unsorted.
    fn scan_versions(&self, name: &str) -> Result<Vec<Version>, RegistryError> {
        let package_dir = self.root.join(name);
        if !package_dir.is_dir() {
            return Err(RegistryError::PackageNotFound {
                package: name.to_string(),
                registry: self.root.clone(),
            });
        }

        let mut versions = Vec::new();
        for entry in WalkDir::new(&package_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| RegistryError::Io {
                path: package_dir.clone(),
                source: e.into(),
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let Some(dir_name) = entry.file_name().to_str() else {
                continue;
            };
            // Non-semver directories are ignored rather than rejected so a
            // registry can hold scratch dirs without breaking lookups.
            if let Ok(version) = dir_name.parse::<Version>() {
                if entry.path().join(RECIPE_FILE_NAME).is_file() {
                    versions.push(version);
                }
            }
        }
        Ok(versions)
    }

    /// Load the summary of one `<name>/<version>` entry.
    fn load_entry(&self, name: &str, version: &Version) -> Result<RecipeSummary, RegistryError> {
        let entry_dir = self.root.join(name).join(version.to_string());
        let invalid = |cause: anyhow::Error| RegistryError::InvalidEntry {
            package: name.to_string(),
            version: version.to_string(),
            reason: format!("{:#}", cause),
        };

        let recipe = Recipe::load(&entry_dir.join(RECIPE_FILE_NAME)).map_err(invalid)?;

        if recipe.name() != name {
            return Err(invalid(anyhow::anyhow!(
                "recipe declares name `{}` but lives under `{}`",
                recipe.name(),
                name
            )));
        }
        if recipe.version() != version {
            return Err(invalid(anyhow::anyhow!(
                "recipe declares version {} but lives under {}",
                recipe.version(),
                version
            )));
        }

        let artifacts = ArtifactDirs {
            include_dir: existing_dir(entry_dir.join("include")),
            lib_dir: self.lib_dir_for(&entry_dir),
        };
        let has_build_script = entry_dir.join("CMakeLists.txt").is_file();

        Ok(RecipeSummary::new(recipe)
            .with_artifacts(artifacts)
            .with_build_script(has_build_script))
    }

    fn lib_dir_for(&self, entry_dir: &Path) -> Option<PathBuf> {
        let lib_root = entry_dir.join("lib");
        if let Some(ref build_type) = self.build_type {
            let narrowed = lib_root.join(build_type);
            if narrowed.is_dir() {
                return Some(narrowed);
            }
        }
        existing_dir(lib_root)
    }
}

fn existing_dir(path: PathBuf) -> Option<PathBuf> {
    path.is_dir().then_some(path)
}

impl Registry for DirRegistry {
    fn name(&self) -> String {
        self.root.display().to_string()
    }

    fn query(&self, name: &str, req: &VersionReq) -> Result<Vec<RecipeSummary>, RegistryError> {
        let mut versions = self.scan_versions(name)?;
        versions.retain(|v| req.matches(v));
        versions.sort();
        versions.reverse();

        versions
            .iter()
            .map(|v| self.load_entry(name, v))
            .collect()
    }

    fn all_versions(&self, name: &str) -> Result<Vec<Version>, RegistryError> {
        let mut versions = self.scan_versions(name)?;
        versions.sort();
        versions.reverse();
        Ok(versions)
    }
}
