//! CLI command definitions.
//!
//! Each subcommand maps to one transpiler or view-finder operation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use plaze_transpiler::Transpiler;
use plaze_view::ViewConfig;

pub mod compile_all;
pub mod find;
pub mod path;
pub mod print;
pub mod status;
pub mod transpile;

/// Configuration file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "plaze.yaml";

/// plaze - Plaze template transpiler
#[derive(Parser)]
#[command(name = "plaze")]
#[command(version, about = "Plaze template transpiler")]
#[command(long_about = r#"
Transpiles Plaze view templates into executable PHP and manages the
compiled view cache.

COMMANDS:
  transpile    → Transpile a template into the cache
  print        → Print the transpiled form of a template
  path         → Show where a template's compiled artifact lives
  status       → Show whether a compiled artifact is stale
  compile-all  → Transpile every template under a directory
  find         → Resolve a view name to its template file

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid configuration or arguments
  3 - Template error
  4 - View not found
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ./plaze.yaml when present)
    #[arg(short, long, global = true, env = "PLAZE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for compiled views, overriding the configuration
    #[arg(long, global = true, env = "PLAZE_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Transpile a template into the compiled view cache
    Transpile(transpile::TranspileArgs),

    /// Print the transpiled form of a template
    Print(print::PrintArgs),

    /// Show the compiled artifact path of a template
    Path(path::PathArgs),

    /// Show whether a template needs transpiling
    Status(status::StatusArgs),

    /// Transpile every template under a directory
    #[command(name = "compile-all")]
    CompileAll(compile_all::CompileAllArgs),

    /// Resolve a view name to a template file
    Find(find::FindArgs),
}

impl Cli {
    /// Load the view configuration and apply command-line overrides.
    pub fn view_config(&self) -> Result<ViewConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                load_config(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => ViewConfig::default(),
        };

        if let Some(cache_dir) = &self.cache_dir {
            config.transpiler.cache_dir = Some(cache_dir.clone());
        }

        Ok(config)
    }
}

fn load_config(path: &Path) -> Result<ViewConfig> {
    debug!("Using configuration {:?}", path);
    ViewConfig::load(path).with_context(|| format!("Failed to load configuration {:?}", path))
}

/// Build a transpiler from the configuration.
pub fn build_transpiler(config: &ViewConfig) -> Result<Transpiler> {
    Transpiler::new(config.transpiler.clone()).context("Failed to set up the transpiler")
}

/// Fail unless the transpiler writes compiled artifacts.
pub fn require_cache(transpiler: &Transpiler) -> Result<()> {
    if transpiler.cache().is_none() {
        anyhow::bail!(plaze_view::ViewError::CacheDisabled);
    }
    Ok(())
}
