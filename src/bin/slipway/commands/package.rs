//! `slipway package` command

use anyhow::Result;

use crate::cli::{GlobalArgs, PackageArgs};
use slipway::ops::{self, PackageOptions};

pub fn execute(globals: &GlobalArgs, args: PackageArgs) -> Result<()> {
    let ctx = super::context(globals)?;

    let opts = PackageOptions {
        settings: args.settings,
        options: args.options,
        jobs: args.jobs,
    };
    let result = ops::package(&ctx, &opts)?;

    eprintln!("    Packaged {}", result.package_dir.display());
    Ok(())
}
