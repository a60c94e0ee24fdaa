//! Print command - Show the transpiled form of a template.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use plaze_view::ViewConfig;

use super::build_transpiler;

#[derive(Args)]
pub struct PrintArgs {
    /// Template file to transpile
    file: PathBuf,
}

pub fn execute(args: PrintArgs, config: &ViewConfig) -> Result<()> {
    debug!("Printing transpiled {:?}", args.file);

    let transpiler = build_transpiler(config)?;
    let source = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {:?}", args.file))?;
    let compiled = transpiler
        .transpile_to_string(&source)
        .with_context(|| format!("Failed to transpile {:?}", args.file))?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(compiled.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
