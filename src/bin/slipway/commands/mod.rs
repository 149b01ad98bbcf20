//! Command implementations

pub mod build;
pub mod completions;
pub mod configure;
pub mod graph;
pub mod package;

use anyhow::Result;

use slipway::util::GlobalContext;

use crate::cli::GlobalArgs;

/// Build the operation context from the global flags.
pub(crate) fn context(globals: &GlobalArgs) -> Result<GlobalContext> {
    let mut ctx = GlobalContext::new()?;
    if let Some(ref registry) = globals.registry {
        ctx.set_registry_root(registry.clone());
    }
    Ok(ctx)
}
