//! Build-tool descriptor generation.
//!
//! Generation is a pure function of the resolved graphs, the frozen
//! configuration snapshot and the layout: it returns (path, contents)
//! pairs and touches no files. [`write_files`] is the separate impure
//! step. Identical inputs produce byte-identical contents, so comparing
//! descriptors against disk is a reliable change detector.
//!
//! Files emitted into the layout's generators directory:
//!
//! - `slipway_toolchain.cmake`, one per configuration
//! - `<dep>-<buildtype>.cmake`, one per regular dependency
//! - `test/<dep>-<buildtype>.cmake`, one per test-only dependency
//!
//! Regular descriptors never mention test-only dependencies; consumers of
//! the packaged library only ever load the top-level files.

mod deps;
mod toolchain;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::core::ConfigSnapshot;
use crate::layout::Layout;
use crate::resolver::PackageGraph;
use crate::util::diagnostic::Diagnostic;
use crate::util::fs::atomic_write;

pub use deps::dependency_files;
pub use toolchain::toolchain_file;

/// File name of the toolchain descriptor.
pub const TOOLCHAIN_FILE_NAME: &str = "slipway_toolchain.cmake";

/// Errors raised while producing descriptors.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// A setting value has no counterpart in the build tool's vocabulary.
    #[error("setting {axis}={value} has no cmake mapping")]
    UnsupportedSetting { axis: String, value: String },
}

impl GenerateError {
    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GenerateError::UnsupportedSetting { axis, value } => {
                Diagnostic::error(format!(
                    "cannot express setting `{}={}` for cmake",
                    axis, value
                ))
                .with_suggestion(format!(
                    "help: Pass a supported value with `-s {}=<value>` or drop the axis from the recipe",
                    axis
                ))
            }
        }
    }
}

/// One descriptor file: target path plus full contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// Generate every descriptor for one configuration.
///
/// The toolchain file comes first, then one dependency descriptor per
/// regular graph node and one per test graph node under `test/`.
pub fn generate(
    graph: &PackageGraph,
    test_graph: &PackageGraph,
    snapshot: &ConfigSnapshot,
    layout: &Layout,
) -> Result<Vec<GeneratedFile>, GenerateError> {
    let mut files = vec![toolchain_file(snapshot, layout)?];
    files.extend(dependency_files(graph, test_graph, snapshot, layout));
    Ok(files)
}

/// Check whether every descriptor already exists on disk with identical
/// contents.
pub fn is_up_to_date(files: &[GeneratedFile]) -> bool {
    files.iter().all(|file| {
        fs::read_to_string(&file.path)
            .map(|on_disk| on_disk == file.contents)
            .unwrap_or(false)
    })
}

/// Write descriptors to disk, atomically per file.
pub fn write_files(files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        atomic_write(&file.path, &file.contents)
            .with_context(|| format!("failed to write descriptor {}", file.path.display()))?;
        tracing::debug!("wrote {}", file.path.display());
    }
    Ok(())
}
