//! Error types for the transpiler.

use thiserror::Error;

use crate::config::TagKind;

/// Result type alias for transpiler operations.
pub type TranspileResult<T> = Result<T, TranspileError>;

/// Errors that can occur while configuring or running the transpiler.
#[derive(Error, Debug)]
pub enum TranspileError {
    #[error("Invalid transpiler configuration: {0}")]
    Configuration(String),

    #[error("Unterminated {tag} tag at offset {offset}")]
    UnterminatedTag { tag: TagKind, offset: usize },

    #[error("Directive '{directive}' failed: {message}")]
    Handler { directive: String, message: String },

    #[error("Invalid tag pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl TranspileError {
    /// Build a handler failure for the named directive.
    pub fn handler(directive: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            directive: directive.into(),
            message: message.into(),
        }
    }

    /// Whether this error points at malformed template source.
    pub fn is_template_error(&self) -> bool {
        matches!(self, Self::UnterminatedTag { .. } | Self::Handler { .. })
    }
}
