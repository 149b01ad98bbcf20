//! Implementation of `slipway configure`.

use std::path::PathBuf;

use anyhow::Result;

use crate::build::{BuildPhase, CMakeTool, Orchestrator};
use crate::ops::resolve::{resolve_project, EvalOptions};
use crate::util::config::Config;
use crate::util::GlobalContext;

/// Outcome of a configure run.
#[derive(Debug)]
pub struct ConfigureResult {
    /// Phase the configuration is in afterwards (at least `Configured`)
    pub phase: BuildPhase,

    /// Build directory for this configuration
    pub build_dir: PathBuf,
}

/// Resolve the project and bring the build directory to `Configured`.
///
/// Re-running with an unchanged configuration is a no-op; a completed
/// build keeps its phase.
pub fn configure(ctx: &GlobalContext, opts: &EvalOptions) -> Result<ConfigureResult> {
    let evaluated = resolve_project(ctx, opts)?;
    tracing::info!("configuration: {}", evaluated.snapshot);

    let tool = make_tool(&evaluated.config, None)?;
    let orchestrator = Orchestrator::new(&tool, &evaluated.layout, &evaluated.snapshot);
    let phase = orchestrator.configure(&evaluated.resolution)?;

    Ok(ConfigureResult {
        phase,
        build_dir: evaluated.layout.build_dir().to_path_buf(),
    })
}

/// Construct the build tool from config, with an optional job override
/// from the command line.
pub(crate) fn make_tool(config: &Config, jobs: Option<usize>) -> Result<CMakeTool> {
    let tool = match config.tool.cmake {
        Some(ref program) => CMakeTool::with_program(program.clone()),
        None => CMakeTool::new()?,
    };
    Ok(tool
        .generator(config.tool.generator.clone())
        .jobs(jobs.or(config.tool.jobs)))
}
