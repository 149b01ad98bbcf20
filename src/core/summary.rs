//! Summary - a recipe plus where its artifacts live.
//!
//! A RecipeSummary is what the registry hands to the resolver: the parsed
//! recipe together with the artifact directories of that registry entry.
//! Summaries are Arc-wrapped internally so graph nodes clone cheaply.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use semver::Version;

use crate::core::recipe::Recipe;
use crate::core::PackageId;

/// Artifact directories of one registry entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactDirs {
    /// Public header directory
    pub include_dir: Option<PathBuf>,

    /// Library directory, already narrowed to the build type when a
    /// per-build-type subdirectory exists
    pub lib_dir: Option<PathBuf>,
}

/// A recipe summary for resolution and generation.
///
/// Summaries are Arc-wrapped internally for cheap cloning.
#[derive(Clone)]
pub struct RecipeSummary {
    inner: Arc<SummaryInner>,
}

#[derive(Clone)]
struct SummaryInner {
    recipe: Recipe,
    artifacts: ArtifactDirs,
    has_build_script: bool,
}

impl RecipeSummary {
    /// Create a new summary from a parsed recipe.
    pub fn new(recipe: Recipe) -> Self {
        RecipeSummary {
            inner: Arc::new(SummaryInner {
                recipe,
                artifacts: ArtifactDirs::default(),
                has_build_script: false,
            }),
        }
    }

    /// Attach the artifact directories of the registry entry.
    pub fn with_artifacts(mut self, artifacts: ArtifactDirs) -> Self {
        let inner = Arc::make_mut(&mut self.inner);
        inner.artifacts = artifacts;
        self
    }

    /// Record whether the entry ships a CMakeLists.txt of its own.
    pub fn with_build_script(mut self, has_build_script: bool) -> Self {
        let inner = Arc::make_mut(&mut self.inner);
        inner.has_build_script = has_build_script;
        self
    }

    /// Get the package ID.
    pub fn package_id(&self) -> &PackageId {
        &self.inner.recipe.package_id
    }

    /// Get the package name.
    pub fn name(&self) -> &str {
        self.inner.recipe.name()
    }

    /// Get the package version.
    pub fn version(&self) -> &Version {
        self.inner.recipe.version()
    }

    /// Get the parsed recipe.
    pub fn recipe(&self) -> &Recipe {
        &self.inner.recipe
    }

    /// Get the directory the recipe was loaded from.
    pub fn dir(&self) -> &Path {
        &self.inner.recipe.recipe_dir
    }

    /// Get the artifact directories.
    pub fn artifacts(&self) -> &ArtifactDirs {
        &self.inner.artifacts
    }

    /// Check whether the entry ships its own CMakeLists.txt.
    pub fn has_build_script(&self) -> bool {
        self.inner.has_build_script
    }
}

impl std::fmt::Debug for RecipeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeSummary")
            .field("package_id", &self.inner.recipe.package_id)
            .field("requirements", &self.inner.recipe.requirements.len())
            .field("artifacts", &self.inner.artifacts)
            .finish()
    }
}

impl std::fmt::Display for RecipeSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner.recipe.package_id)
    }
}

impl PartialEq for RecipeSummary {
    fn eq(&self, other: &Self) -> bool {
        self.package_id() == other.package_id()
    }
}

impl Eq for RecipeSummary {}

impl std::hash::Hash for RecipeSummary {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.package_id().hash(state);
    }
}
