//! Implementation of `slipway build`.

use std::path::PathBuf;

use anyhow::Result;

use crate::build::{BuildPhase, Orchestrator};
use crate::ops::resolve::{resolve_project, EvalOptions};
use crate::ops::slipway_configure::make_tool;
use crate::util::GlobalContext;

/// Options for `slipway build`.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// `-s axis=value` pairs
    pub settings: Vec<(String, String)>,

    /// `-o name=value` pairs
    pub options: Vec<(String, String)>,

    /// Parallel build jobs, overriding the config value
    pub jobs: Option<usize>,
}

/// Outcome of a build run.
#[derive(Debug)]
pub struct BuildResult {
    /// Phase the configuration is in afterwards (at least `Built`)
    pub phase: BuildPhase,

    /// Build directory for this configuration
    pub build_dir: PathBuf,
}

/// Build the current configuration, configuring it first when needed.
pub fn build(ctx: &GlobalContext, opts: &BuildOptions) -> Result<BuildResult> {
    let eval = EvalOptions {
        settings: opts.settings.clone(),
        options: opts.options.clone(),
    };
    let evaluated = resolve_project(ctx, &eval)?;
    tracing::info!("configuration: {}", evaluated.snapshot);

    let tool = make_tool(&evaluated.config, opts.jobs)?;
    let orchestrator = Orchestrator::new(&tool, &evaluated.layout, &evaluated.snapshot);
    orchestrator.configure(&evaluated.resolution)?;
    let phase = orchestrator.build()?;

    Ok(BuildResult {
        phase,
        build_dir: evaluated.layout.build_dir().to_path_buf(),
    })
}
