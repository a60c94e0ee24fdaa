//! Transpiler configuration.
//!
//! Delimiters, the echo format and the cache location are data-driven so a
//! project can override them from a YAML file instead of code.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{TranspileError, TranspileResult};

/// Placeholder substituted with the echoed expression in `echo_format`.
pub const ECHO_PLACEHOLDER: &str = "%s";

/// Default file extension of compiled artifacts.
pub const DEFAULT_COMPILED_EXTENSION: &str = "php";

/// The families of tags the transpiler recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Comment,
    Directive,
    RawEcho,
    EscapedEcho,
    RegularEcho,
}

impl fmt::Display for TagKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Comment => "comment",
            Self::Directive => "directive",
            Self::RawEcho => "raw echo",
            Self::EscapedEcho => "escaped echo",
            Self::RegularEcho => "regular echo",
        };
        f.write_str(label)
    }
}

/// An opening and closing delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagPair {
    pub open: String,
    pub close: String,
}

impl TagPair {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    fn is_blank(&self) -> bool {
        self.open.trim().is_empty() || self.close.trim().is_empty()
    }
}

/// Configuration for a [`Transpiler`](crate::Transpiler).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranspilerConfig {
    /// Directory receiving compiled artifacts. `None` disables on-disk caching.
    pub cache_dir: Option<PathBuf>,
    /// Unescaped echo delimiters
    pub raw_tags: TagPair,
    /// Always-escaped echo delimiters
    pub escaped_tags: TagPair,
    /// Regular echo delimiters, rendered through `echo_format`
    pub content_tags: TagPair,
    /// Comment delimiters; comments are stripped from the output
    pub comment_tags: TagPair,
    /// Wrapper applied to regular echoes, `%s` marks the expression
    pub echo_format: String,
    /// Extension of compiled artifacts (without the dot)
    pub compiled_extension: String,
}

impl Default for TranspilerConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            raw_tags: TagPair::new("{!!", "!!}"),
            escaped_tags: TagPair::new("{{{", "}}}"),
            content_tags: TagPair::new("{{", "}}"),
            comment_tags: TagPair::new("{{--", "--}}"),
            echo_format: "e(%s)".to_string(),
            compiled_extension: DEFAULT_COMPILED_EXTENSION.to_string(),
        }
    }
}

impl TranspilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from YAML. Missing keys keep their defaults.
    pub fn from_yaml_str(content: &str) -> TranspileResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> TranspileResult<Self> {
        let path = path.as_ref();
        debug!("Loading transpiler config from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_dir = None;
        self
    }

    pub fn with_raw_tags(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.raw_tags = TagPair::new(open, close);
        self
    }

    pub fn with_escaped_tags(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.escaped_tags = TagPair::new(open, close);
        self
    }

    pub fn with_content_tags(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.content_tags = TagPair::new(open, close);
        self
    }

    pub fn with_comment_tags(mut self, open: impl Into<String>, close: impl Into<String>) -> Self {
        self.comment_tags = TagPair::new(open, close);
        self
    }

    pub fn with_echo_format(mut self, format: impl Into<String>) -> Self {
        self.echo_format = format.into();
        self
    }

    pub fn with_compiled_extension(mut self, extension: impl Into<String>) -> Self {
        self.compiled_extension = extension.into();
        self
    }

    /// Delimiters for the given tag family. Directives have none.
    pub fn tags(&self, kind: TagKind) -> Option<&TagPair> {
        match kind {
            TagKind::Comment => Some(&self.comment_tags),
            TagKind::RawEcho => Some(&self.raw_tags),
            TagKind::EscapedEcho => Some(&self.escaped_tags),
            TagKind::RegularEcho => Some(&self.content_tags),
            TagKind::Directive => None,
        }
    }

    /// Replace the delimiters of a tag family.
    pub fn set_tags(&mut self, kind: TagKind, tags: TagPair) -> TranspileResult<()> {
        let slot = match kind {
            TagKind::Comment => &mut self.comment_tags,
            TagKind::RawEcho => &mut self.raw_tags,
            TagKind::EscapedEcho => &mut self.escaped_tags,
            TagKind::RegularEcho => &mut self.content_tags,
            TagKind::Directive => {
                return Err(TranspileError::Configuration(
                    "directives have no configurable delimiters".to_string(),
                ))
            }
        };
        *slot = tags;
        Ok(())
    }

    /// Wrap an echoed expression in the configured echo format.
    pub fn format_echo(&self, expression: &str) -> String {
        self.echo_format.replacen(ECHO_PLACEHOLDER, expression, 1)
    }

    /// Check the configuration for values the transpiler cannot work with.
    pub fn validate(&self) -> TranspileResult<()> {
        if let Some(dir) = &self.cache_dir {
            if dir.as_os_str().to_string_lossy().trim().is_empty() {
                return Err(TranspileError::Configuration(
                    "Please verify that the cache path is valid".to_string(),
                ));
            }
        }

        for (kind, tags) in self.delimited_families() {
            if tags.is_blank() {
                return Err(TranspileError::Configuration(format!(
                    "{} delimiters must not be empty",
                    kind
                )));
            }
        }

        let opens = [
            &self.raw_tags.open,
            &self.escaped_tags.open,
            &self.content_tags.open,
        ];
        for (i, open) in opens.iter().enumerate() {
            if opens[i + 1..].contains(open) {
                return Err(TranspileError::Configuration(format!(
                    "echo families share the opening delimiter '{}'",
                    open
                )));
            }
        }

        if !self.echo_format.contains(ECHO_PLACEHOLDER) {
            return Err(TranspileError::Configuration(format!(
                "echo format '{}' has no '{}' placeholder",
                self.echo_format, ECHO_PLACEHOLDER
            )));
        }

        let extension = self.compiled_extension.trim();
        if extension.is_empty() || extension.contains(['/', '\\', '.']) {
            return Err(TranspileError::Configuration(format!(
                "invalid compiled extension '{}'",
                self.compiled_extension
            )));
        }

        Ok(())
    }

    fn delimited_families(&self) -> [(TagKind, &TagPair); 4] {
        [
            (TagKind::Comment, &self.comment_tags),
            (TagKind::RawEcho, &self.raw_tags),
            (TagKind::EscapedEcho, &self.escaped_tags),
            (TagKind::RegularEcho, &self.content_tags),
        ]
    }
}
