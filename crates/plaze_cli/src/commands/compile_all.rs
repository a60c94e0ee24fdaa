//! Compile-all command - Transpile every template under a directory.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};
use walkdir::WalkDir;

use plaze_transpiler::Transpiler;
use plaze_view::ViewConfig;

use super::{build_transpiler, require_cache};

#[derive(Args)]
pub struct CompileAllArgs {
    /// Directory holding the templates
    dir: PathBuf,

    /// Transpile even when compiled artifacts are fresh
    #[arg(short, long)]
    force: bool,

    /// Template extension to match (repeatable, defaults to the configured ones)
    #[arg(short, long = "extension")]
    extensions: Vec<String>,
}

/// Outcome of a compile-all run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CompileSummary {
    pub compiled: usize,
    pub fresh: usize,
    pub failed: Vec<(PathBuf, String)>,
}

pub fn execute(args: CompileAllArgs, config: &ViewConfig, quiet: bool) -> Result<()> {
    if !args.dir.is_dir() {
        anyhow::bail!("Template directory not found: {:?}", args.dir);
    }

    let transpiler = build_transpiler(config)?;
    require_cache(&transpiler)?;

    let extensions = if args.extensions.is_empty() {
        config.extensions.clone()
    } else {
        args.extensions.clone()
    };

    let summary = compile_dir(&transpiler, &args.dir, &extensions, args.force);

    if !quiet {
        for (path, error) in &summary.failed {
            println!("❌ {}: {}", path.display(), error);
        }
        println!(
            "Results: {} compiled, {} up to date, {} failed",
            summary.compiled,
            summary.fresh,
            summary.failed.len()
        );
    }

    if !summary.failed.is_empty() {
        anyhow::bail!("{} template(s) failed to transpile", summary.failed.len());
    }

    Ok(())
}

/// Transpile the matching templates under `dir`, continuing past failures.
pub fn compile_dir(
    transpiler: &Transpiler,
    dir: &Path,
    extensions: &[String],
    force: bool,
) -> CompileSummary {
    let mut summary = CompileSummary::default();

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| has_extension(e.path(), extensions))
    {
        let path = entry.path();
        let result = if force {
            transpiler.transpile(path).map(|written| written.is_some())
        } else {
            transpiler.transpile_if_stale(path)
        };

        match result {
            Ok(true) => {
                info!("Compiled {:?}", path);
                summary.compiled += 1;
            }
            Ok(false) => summary.fresh += 1,
            Err(e) => {
                warn!("Failed to transpile {:?}: {}", path, e);
                summary.failed.push((path.to_path_buf(), e.to_string()));
            }
        }
    }

    summary
}

/// Whether the file name ends with `.{extension}` for one of `extensions`.
fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    extensions.iter().any(|extension| {
        name.strip_suffix(extension.as_str())
            .is_some_and(|stem| stem.len() > 1 && stem.ends_with('.'))
    })
}
