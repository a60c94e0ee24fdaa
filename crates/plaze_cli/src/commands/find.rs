//! Find command - Resolve a view name to its template file.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::debug;

use plaze_view::{CompilingEngine, ViewConfig};

#[derive(Args)]
pub struct FindArgs {
    /// View name, e.g. `admin.users` or `mail::welcome`
    view: String,

    /// Extra search path, tried after the configured ones (repeatable)
    #[arg(short, long = "path")]
    paths: Vec<PathBuf>,

    /// Also transpile the view and print the compiled artifact path
    #[arg(long)]
    compiled: bool,
}

pub fn execute(args: FindArgs, config: &ViewConfig) -> Result<()> {
    let mut engine = CompilingEngine::from_config(config)?;
    for path in args.paths {
        engine.finder_mut().add_location(path);
    }
    debug!("Finding view {} with {:?}", args.view, engine.finder());

    if args.compiled {
        let compiled = engine.resolve(&args.view)?;
        println!("{}", compiled.display());
    } else {
        let template = engine.finder().find(&args.view)?;
        println!("{}", template.display());
    }

    Ok(())
}
