//! Path command - Show where a template is compiled to.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use plaze_view::ViewConfig;

use super::{build_transpiler, require_cache};

#[derive(Args)]
pub struct PathArgs {
    /// Template file
    file: PathBuf,
}

pub fn execute(args: PathArgs, config: &ViewConfig) -> Result<()> {
    let transpiler = build_transpiler(config)?;
    require_cache(&transpiler)?;

    let compiled = transpiler
        .compiled_path_for(&args.file)
        .context("No compiled path available")?;
    println!("{}", compiled.display());

    Ok(())
}
