//! Locating view files on disk.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use plaze_transpiler::{Filesystem, LocalFilesystem};
use tracing::debug;

use crate::error::{ViewError, ViewResult};
use crate::name::ViewName;

/// Extensions tried when no others are configured, in priority order.
pub const DEFAULT_EXTENSIONS: [&str; 2] = ["plaze.php", "php"];

/// Finds view files by name across search paths and namespaces.
///
/// Successful lookups are memoized until [`flush`](Self::flush) is called
/// or the locations change.
pub struct FileViewFinder {
    files: Arc<dyn Filesystem>,
    paths: Vec<PathBuf>,
    hints: HashMap<String, Vec<PathBuf>>,
    extensions: Vec<String>,
    views: RwLock<HashMap<String, PathBuf>>,
}

impl FileViewFinder {
    /// Create a finder over `paths` using the local disk.
    pub fn new(paths: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self::with_filesystem(paths, Arc::new(LocalFilesystem))
    }

    pub fn with_filesystem(
        paths: impl IntoIterator<Item = impl Into<PathBuf>>,
        files: Arc<dyn Filesystem>,
    ) -> Self {
        Self {
            files,
            paths: paths.into_iter().map(Into::into).collect(),
            hints: HashMap::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            views: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a view name to a file path.
    pub fn find(&self, name: &str) -> ViewResult<PathBuf> {
        let name = ViewName::normalize(name);

        if let Some(path) = self.views.read().get(&name) {
            return Ok(path.clone());
        }

        let path = if ViewName::has_hint(&name) {
            let (namespace, view) = ViewName::split_hint(&name)?;
            let paths = self
                .hints
                .get(namespace)
                .ok_or_else(|| ViewError::UnknownNamespace(namespace.to_string()))?;
            self.find_in_paths(&name, view, paths)?
        } else {
            self.find_in_paths(&name, &name, &self.paths)?
        };

        debug!("Found view {} at {:?}", name, path);
        self.views.write().insert(name, path.clone());
        Ok(path)
    }

    fn find_in_paths(&self, name: &str, view: &str, paths: &[PathBuf]) -> ViewResult<PathBuf> {
        let mut tried = Vec::new();

        for dir in paths {
            for file in self.possible_files(view) {
                let candidate = dir.join(file);
                if self.files.exists(&candidate) {
                    return Ok(candidate);
                }
                tried.push(candidate);
            }
        }

        Err(ViewError::NotFound {
            name: name.to_string(),
            tried,
        })
    }

    /// Candidate file names for a dotted view name.
    fn possible_files(&self, view: &str) -> Vec<String> {
        let stem = ViewName::to_relative_path(view);
        self.extensions
            .iter()
            .map(|extension| format!("{}.{}", stem, extension))
            .collect()
    }

    /// Append a search path.
    pub fn add_location(&mut self, location: impl Into<PathBuf>) {
        self.paths.push(location.into());
        self.flush();
    }

    /// Put a search path in front of the others.
    pub fn prepend_location(&mut self, location: impl Into<PathBuf>) {
        self.paths.insert(0, location.into());
        self.flush();
    }

    /// Add hint paths for a namespace, after any it already has.
    pub fn add_namespace(
        &mut self,
        namespace: impl Into<String>,
        hints: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) {
        self.hints
            .entry(namespace.into())
            .or_default()
            .extend(hints.into_iter().map(Into::into));
        self.flush();
    }

    /// Add hint paths for a namespace, before any it already has.
    pub fn prepend_namespace(
        &mut self,
        namespace: impl Into<String>,
        hints: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) {
        let entry = self.hints.entry(namespace.into()).or_default();
        let mut paths: Vec<PathBuf> = hints.into_iter().map(Into::into).collect();
        paths.append(entry);
        *entry = paths;
        self.flush();
    }

    /// Replace every hint path of a namespace.
    pub fn replace_namespace(
        &mut self,
        namespace: impl Into<String>,
        hints: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) {
        self.hints.insert(
            namespace.into(),
            hints.into_iter().map(Into::into).collect(),
        );
        self.flush();
    }

    /// Register an extension, giving it the highest priority.
    pub fn add_extension(&mut self, extension: impl Into<String>) {
        let extension = extension.into();
        self.extensions.retain(|existing| existing != &extension);
        self.extensions.insert(0, extension);
        self.flush();
    }

    /// Replace the extension list, highest priority first.
    pub fn set_extensions(&mut self, extensions: impl IntoIterator<Item = impl Into<String>>) {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self.flush();
    }

    /// Forget every memoized lookup.
    pub fn flush(&self) {
        self.views.write().clear();
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn hints(&self) -> &HashMap<String, Vec<PathBuf>> {
        &self.hints
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Whether a view file exists at `path`.
    pub fn exists(&self, path: &Path) -> bool {
        self.files.exists(path)
    }
}

impl fmt::Debug for FileViewFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileViewFinder")
            .field("paths", &self.paths)
            .field("hints", &self.hints)
            .field("extensions", &self.extensions)
            .field("cached", &self.views.read().len())
            .finish()
    }
}
