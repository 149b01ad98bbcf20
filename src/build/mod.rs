//! Build orchestration.
//!
//! Drives one configuration through configure, build and package. Each
//! step persists its completion through [`BuildState`], so re-runs skip
//! work that is already done and an interrupted step resumes cleanly.
//! The external tool is only reached through the [`BuildTool`] trait.

pub mod state;
pub mod tool;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::core::{ConfigSnapshot, Recipe};
use crate::generator::{self, TOOLCHAIN_FILE_NAME};
use crate::layout::Layout;
use crate::resolver::{PackageGraph, Resolution};
use crate::util::fs::{ensure_dir, glob_files};

pub use state::{BuildPhase, BuildState, STATE_FILE_NAME};
pub use tool::{BuildError, BuildTool, CMakeTool, ConfigureError};

/// Runs the build pipeline for one configuration of one package.
pub struct Orchestrator<'a> {
    tool: &'a dyn BuildTool,
    layout: &'a Layout,
    snapshot: &'a ConfigSnapshot,
}

impl<'a> Orchestrator<'a> {
    pub fn new(tool: &'a dyn BuildTool, layout: &'a Layout, snapshot: &'a ConfigSnapshot) -> Self {
        Orchestrator {
            tool,
            layout,
            snapshot,
        }
    }

    /// Configure step.
    ///
    /// Regenerates descriptors and compares them with what is on disk;
    /// when nothing changed and a configure already completed, the tool is
    /// not re-invoked and a completed build keeps its phase. Otherwise the
    /// descriptors are written, test-only dependencies are built in
    /// isolation, and the tool's configure step runs.
    pub fn configure(&self, resolution: &Resolution) -> Result<BuildPhase> {
        let files = generator::generate(
            &resolution.graph,
            &resolution.test_graph,
            self.snapshot,
            self.layout,
        )?;

        let mut state = BuildState::load(self.layout, &self.snapshot.fingerprint());
        if state.phase() >= BuildPhase::Configured && generator::is_up_to_date(&files) {
            tracing::info!("configure is up to date");
            return Ok(state.phase());
        }

        generator::write_files(&files)?;
        self.build_test_deps(&resolution.test_graph)?;

        let toolchain = self.layout.generators_dir().join(TOOLCHAIN_FILE_NAME);
        self.tool
            .configure(self.layout.source_dir(), self.layout.build_dir(), &toolchain)?;

        state.record(BuildPhase::Configured)?;
        Ok(BuildPhase::Configured)
    }

    /// Build step. Requires a completed configure.
    pub fn build(&self) -> Result<BuildPhase> {
        let mut state = BuildState::load(self.layout, &self.snapshot.fingerprint());
        if state.phase() < BuildPhase::Configured {
            bail!("this configuration is not configured yet; run `slipway configure` first");
        }

        if let Err(err) = self.tool.build(self.layout.build_dir()) {
            state.mark_failed();
            return Err(err);
        }

        state.record(BuildPhase::Built)?;
        Ok(BuildPhase::Built)
    }

    /// Package step. Requires a completed build.
    ///
    /// Without a `[package-files]` section this is an explicit no-op that
    /// still counts as success; recipes for applications and examples
    /// simply have nothing to distribute.
    pub fn package(&self, recipe: &Recipe) -> Result<BuildPhase> {
        let mut state = BuildState::load(self.layout, &self.snapshot.fingerprint());
        if state.phase() < BuildPhase::Built {
            bail!("nothing is built for this configuration; run `slipway build` first");
        }

        let Some(ref package_files) = recipe.package_files else {
            tracing::info!("no [package-files] section, nothing to package");
            state.record(BuildPhase::Packaged)?;
            return Ok(BuildPhase::Packaged);
        };

        ensure_dir(self.layout.package_dir())?;

        let headers = copy_tree(
            self.layout.source_dir(),
            &package_files.include,
            self.layout.package_dir(),
        )?;
        let libs = copy_flat(
            self.layout.build_dir(),
            &package_files.libs,
            &self.layout.package_dir().join("lib"),
        )?;

        tracing::info!(
            "packaged {} header(s) and {} lib file(s) into {}",
            headers,
            libs,
            self.layout.package_dir().display()
        );

        state.record(BuildPhase::Packaged)?;
        Ok(BuildPhase::Packaged)
    }

    /// Build test-only dependencies that ship their own build script,
    /// each in its own tree under `test-deps/`, dependencies first.
    fn build_test_deps(&self, test_graph: &PackageGraph) -> Result<()> {
        let toolchain = self.layout.generators_dir().join(TOOLCHAIN_FILE_NAME);

        for id in test_graph.topological_order() {
            let Some(node) = test_graph.get(&id) else {
                continue;
            };
            if !node.summary().has_build_script() {
                continue;
            }

            let build_dir = self.layout.test_dep_build_dir(id.name());
            tracing::info!("building test dependency {}", id);
            self.tool
                .configure(node.summary().dir(), &build_dir, &toolchain)
                .with_context(|| format!("failed to configure test dependency {}", id))?;
            self.tool
                .build(&build_dir)
                .with_context(|| format!("failed to build test dependency {}", id))?;
        }
        Ok(())
    }
}

/// Copy glob matches keeping their path relative to `base`.
fn copy_tree(base: &Path, patterns: &[String], dest: &Path) -> Result<usize> {
    let files = glob_files(base, patterns)?;
    for file in &files {
        let relative = file.strip_prefix(base).unwrap_or(file);
        let target = dest.join(relative);
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        fs::copy(file, &target)
            .with_context(|| format!("failed to copy {}", file.display()))?;
    }
    Ok(files.len())
}

/// Copy glob matches flattened into `dest`.
fn copy_flat(base: &Path, patterns: &[String], dest: &Path) -> Result<usize> {
    let mut copied = 0;
    for file in glob_files(base, patterns)? {
        // On a re-run the glob sees the previous output; copying a file
        // onto itself would truncate it.
        if file.starts_with(dest) {
            continue;
        }
        let Some(name) = file.file_name() else {
            continue;
        };
        ensure_dir(dest)?;
        fs::copy(&file, dest.join(name))
            .with_context(|| format!("failed to copy {}", file.display()))?;
        copied += 1;
    }
    Ok(copied)
}
