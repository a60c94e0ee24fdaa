//! Plaze CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid configuration or arguments
//! - 3: Template error
//! - 4: View not found

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plaze_transpiler::TranspileError;
use plaze_view::ViewError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_CONFIG: u8 = 2;
    pub const TEMPLATE_ERROR: u8 = 3;
    pub const VIEW_NOT_FOUND: u8 = 4;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "plaze=debug,warn"
    } else if cli.quiet {
        "error"
    } else {
        "plaze=info,warn"
    };

    // RUST_LOG wins over the flags
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .try_init();
    if let Err(e) = log_result {
        tracing::debug!("Logging already initialized: {}", e);
    }

    let result = cli.view_config().and_then(|config| match cli.command {
        Commands::Transpile(args) => commands::transpile::execute(args, &config, cli.quiet),
        Commands::Print(args) => commands::print::execute(args, &config),
        Commands::Path(args) => commands::path::execute(args, &config),
        Commands::Status(args) => commands::status::execute(args, &config),
        Commands::CompileAll(args) => commands::compile_all::execute(args, &config, cli.quiet),
        Commands::Find(args) => commands::find::execute(args, &config),
    });

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<ViewError>() {
            match err {
                ViewError::NotFound { .. } | ViewError::UnknownNamespace(_) => {
                    return ExitCodes::VIEW_NOT_FOUND
                }
                ViewError::InvalidName(_) | ViewError::CacheDisabled | ViewError::Yaml(_) => {
                    return ExitCodes::INVALID_CONFIG
                }
                _ => {}
            }
        }
        if let Some(err) = cause.downcast_ref::<TranspileError>() {
            if err.is_template_error() {
                return ExitCodes::TEMPLATE_ERROR;
            }
            if matches!(err, TranspileError::Configuration(_) | TranspileError::Yaml(_)) {
                return ExitCodes::INVALID_CONFIG;
            }
        }
    }
    ExitCodes::GENERAL_ERROR
}
