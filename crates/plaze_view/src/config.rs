//! View configuration.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use plaze_transpiler::TranspilerConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ViewResult;
use crate::finder::{FileViewFinder, DEFAULT_EXTENSIONS};

/// Where views live and how they are compiled.
///
/// ```yaml
/// paths:
///   - resources/views
/// namespaces:
///   mail:
///     - resources/views/vendor/mail
/// transpiler:
///   cache_dir: storage/framework/views
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Search paths for views without a namespace hint
    pub paths: Vec<PathBuf>,
    /// Hint paths per namespace
    pub namespaces: HashMap<String, Vec<PathBuf>>,
    /// View file extensions, highest priority first
    pub extensions: Vec<String>,
    pub transpiler: TranspilerConfig,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            namespaces: HashMap::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            transpiler: TranspilerConfig::default(),
        }
    }
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml_str(content: &str) -> ViewResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> ViewResult<Self> {
        let path = path.as_ref();
        debug!("Loading view config from {:?}", path);
        let content = fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.push(path.into());
        self
    }

    pub fn with_namespace(
        mut self,
        namespace: impl Into<String>,
        hints: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        self.namespaces
            .entry(namespace.into())
            .or_default()
            .extend(hints.into_iter().map(Into::into));
        self
    }

    pub fn with_transpiler(mut self, transpiler: TranspilerConfig) -> Self {
        self.transpiler = transpiler;
        self
    }

    /// Build a finder for the configured locations.
    pub fn finder(&self) -> FileViewFinder {
        let mut finder = FileViewFinder::new(self.paths.iter().cloned());
        for (namespace, hints) in &self.namespaces {
            finder.add_namespace(namespace.clone(), hints.iter().cloned());
        }
        finder.set_extensions(self.extensions.iter().cloned());
        finder
    }
}
