//! `slipway configure` command

use anyhow::Result;

use crate::cli::{ConfigureArgs, GlobalArgs};
use slipway::ops::{self, EvalOptions};

pub fn execute(globals: &GlobalArgs, args: ConfigureArgs) -> Result<()> {
    let ctx = super::context(globals)?;

    let opts = EvalOptions {
        settings: args.settings,
        options: args.options,
    };
    let result = ops::configure(&ctx, &opts)?;

    eprintln!("    Configured {}", result.build_dir.display());
    Ok(())
}
