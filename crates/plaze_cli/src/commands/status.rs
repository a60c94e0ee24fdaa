//! Status command - Report whether a compiled artifact is stale.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use plaze_view::ViewConfig;

use super::{build_transpiler, require_cache};

#[derive(Args)]
pub struct StatusArgs {
    /// Template file
    file: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Cache state of a single template.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub source: PathBuf,
    pub source_modified: DateTime<Utc>,
    pub compiled: PathBuf,
    pub compiled_modified: Option<DateTime<Utc>>,
    pub stale: bool,
}

pub fn execute(args: StatusArgs, config: &ViewConfig) -> Result<()> {
    let report = report(&args.file, config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("📄 Source:   {} ({})", report.source.display(), report.source_modified.to_rfc3339());
    match report.compiled_modified {
        Some(modified) => println!(
            "📦 Compiled: {} ({})",
            report.compiled.display(),
            modified.to_rfc3339()
        ),
        None => println!("📦 Compiled: {} (missing)", report.compiled.display()),
    }
    if report.stale {
        println!("⚠️  Stale, will be transpiled on next use");
    } else {
        println!("✅ Up to date");
    }

    Ok(())
}

/// Gather the cache state of `file`.
pub fn report(file: &Path, config: &ViewConfig) -> Result<StatusReport> {
    let transpiler = build_transpiler(config)?;
    require_cache(&transpiler)?;

    let source_modified = modified(file)
        .with_context(|| format!("Failed to read metadata of {:?}", file))?;
    let compiled = transpiler
        .compiled_path_for(file)
        .context("No compiled path available")?;
    let compiled_modified = modified(&compiled).ok();
    let stale = transpiler.is_stale(file)?;

    Ok(StatusReport {
        source: file.to_path_buf(),
        source_modified,
        compiled,
        compiled_modified,
        stale,
    })
}

fn modified(path: &Path) -> std::io::Result<DateTime<Utc>> {
    Ok(fs::metadata(path)?.modified()?.into())
}
