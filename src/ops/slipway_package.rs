//! Implementation of `slipway package`.

use std::path::PathBuf;

use anyhow::Result;

use crate::build::{BuildPhase, Orchestrator};
use crate::ops::resolve::{resolve_project, EvalOptions};
use crate::ops::slipway_configure::make_tool;
use crate::util::GlobalContext;

/// Options for `slipway package`.
#[derive(Debug, Clone, Default)]
pub struct PackageOptions {
    /// `-s axis=value` pairs
    pub settings: Vec<(String, String)>,

    /// `-o name=value` pairs
    pub options: Vec<(String, String)>,

    /// Parallel build jobs, overriding the config value
    pub jobs: Option<usize>,
}

/// Outcome of a package run.
#[derive(Debug)]
pub struct PackageResult {
    /// Phase the configuration is in afterwards (`Packaged`)
    pub phase: BuildPhase,

    /// Directory the package tree was assembled in
    pub package_dir: PathBuf,
}

/// Package the current configuration, configuring and building first
/// when needed.
///
/// A recipe without a `[package-files]` section packages nothing and
/// still succeeds.
pub fn package(ctx: &GlobalContext, opts: &PackageOptions) -> Result<PackageResult> {
    let eval = EvalOptions {
        settings: opts.settings.clone(),
        options: opts.options.clone(),
    };
    let evaluated = resolve_project(ctx, &eval)?;
    tracing::info!("configuration: {}", evaluated.snapshot);

    let tool = make_tool(&evaluated.config, opts.jobs)?;
    let orchestrator = Orchestrator::new(&tool, &evaluated.layout, &evaluated.snapshot);
    orchestrator.configure(&evaluated.resolution)?;
    orchestrator.build()?;
    let phase = orchestrator.package(&evaluated.recipe)?;

    Ok(PackageResult {
        phase,
        package_dir: evaluated.layout.package_dir().to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    use crate::test_support::ProjectFixture;

    #[test]
    fn test_package_without_section_succeeds() {
        let tmp = TempDir::new().unwrap();
        let project = ProjectFixture::application("app")
            .with_config(&tmp.path().join("registry"), "true")
            .write_to(tmp.path())
            .unwrap();

        let ctx = GlobalContext::with_cwd(project).unwrap();
        let result = package(&ctx, &PackageOptions::default()).unwrap();
        assert_eq!(result.phase, BuildPhase::Packaged);
    }

    #[test]
    fn test_package_copies_declared_headers() {
        let tmp = TempDir::new().unwrap();
        let project = ProjectFixture::new("chess-model")
            .with_recipe(
                r#"
[package]
name = "chess-model"
version = "1.0.0"
type = "library"

[package-files]
include = ["include/**/*.h"]
libs = ["**/*.a"]
"#,
            )
            .with_file("include/chess/board.h", "#pragma once\n")
            .with_config(&tmp.path().join("registry"), "true")
            .write_to(tmp.path())
            .unwrap();

        let ctx = GlobalContext::with_cwd(project).unwrap();
        let result = package(&ctx, &PackageOptions::default()).unwrap();

        assert_eq!(result.phase, BuildPhase::Packaged);
        assert!(result
            .package_dir
            .join("include")
            .join("chess")
            .join("board.h")
            .is_file());
    }
}
