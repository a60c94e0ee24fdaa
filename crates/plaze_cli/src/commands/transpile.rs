//! Transpile command - Write a template's compiled artifact.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use plaze_view::ViewConfig;

use super::{build_transpiler, require_cache};

#[derive(Args)]
pub struct TranspileArgs {
    /// Template file to transpile
    file: PathBuf,

    /// Transpile even when the compiled artifact is fresh
    #[arg(short, long)]
    force: bool,
}

pub fn execute(args: TranspileArgs, config: &ViewConfig, quiet: bool) -> Result<()> {
    info!("Transpiling {:?}", args.file);

    let transpiler = build_transpiler(config)?;
    require_cache(&transpiler)?;

    let result = if args.force {
        transpiler.transpile(&args.file).map(|path| path.is_some())
    } else {
        transpiler.transpile_if_stale(&args.file)
    };
    let written = result.with_context(|| format!("Failed to transpile {:?}", args.file))?;

    let compiled = transpiler
        .compiled_path_for(&args.file)
        .context("No compiled path available")?;

    if !quiet {
        if written {
            println!("✅ {} → {}", args.file.display(), compiled.display());
        } else {
            println!("✔️  {} is up to date ({})", args.file.display(), compiled.display());
        }
    }

    Ok(())
}
