//! Error types for view resolution.

use std::path::PathBuf;

use plaze_transpiler::TranspileError;
use thiserror::Error;

/// Result type alias for view operations.
pub type ViewResult<T> = Result<T, ViewError>;

/// Errors that can occur while locating or compiling views.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("View [{name}] not found, tried: {}", format_tried(.tried))]
    NotFound { name: String, tried: Vec<PathBuf> },

    #[error("Invalid view name [{0}]")]
    InvalidName(String),

    #[error("No hint path defined for [{0}]")]
    UnknownNamespace(String),

    #[error("No cache directory configured for compiled views")]
    CacheDisabled,

    #[error("Transpile error: {0}")]
    Transpile(#[from] TranspileError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn format_tried(tried: &[PathBuf]) -> String {
    if tried.is_empty() {
        return "no locations".to_string();
    }
    tried
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
