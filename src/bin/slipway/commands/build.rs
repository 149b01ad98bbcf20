//! `slipway build` command

use anyhow::Result;

use crate::cli::{BuildArgs, GlobalArgs};
use slipway::ops::{self, BuildOptions};

pub fn execute(globals: &GlobalArgs, args: BuildArgs) -> Result<()> {
    let ctx = super::context(globals)?;

    let opts = BuildOptions {
        settings: args.settings,
        options: args.options,
        jobs: args.jobs,
    };
    let result = ops::build(&ctx, &opts)?;

    eprintln!("    Built {}", result.build_dir.display());
    Ok(())
}
