//! Engine serving compiled views.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use plaze_transpiler::Transpiler;
use tracing::{debug, info};

use crate::config::ViewConfig;
use crate::error::{ViewError, ViewResult};
use crate::finder::FileViewFinder;

/// Resolves view names to compiled artifacts, transpiling on demand.
#[derive(Debug)]
pub struct CompilingEngine {
    transpiler: Arc<Transpiler>,
    finder: FileViewFinder,
}

impl CompilingEngine {
    pub fn new(transpiler: Arc<Transpiler>, finder: FileViewFinder) -> Self {
        Self { transpiler, finder }
    }

    /// Build an engine from a view configuration.
    pub fn from_config(config: &ViewConfig) -> ViewResult<Self> {
        let transpiler = Transpiler::new(config.transpiler.clone())?;
        Ok(Self::new(Arc::new(transpiler), config.finder()))
    }

    pub fn transpiler(&self) -> &Arc<Transpiler> {
        &self.transpiler
    }

    pub fn finder(&self) -> &FileViewFinder {
        &self.finder
    }

    pub fn finder_mut(&mut self) -> &mut FileViewFinder {
        &mut self.finder
    }

    /// Compiled artifact for the template at `path`, transpiled if stale.
    pub fn compiled(&self, path: &Path) -> ViewResult<PathBuf> {
        let target = self
            .transpiler
            .compiled_path_for(path)
            .ok_or(ViewError::CacheDisabled)?;

        if self.transpiler.transpile_if_stale(path)? {
            info!("Compiled view {:?}", path);
        } else {
            debug!("Compiled view {:?} is fresh", path);
        }

        Ok(target)
    }

    /// Find a view by name and return its compiled artifact.
    pub fn resolve(&self, name: &str) -> ViewResult<PathBuf> {
        let path = self.finder.find(name)?;
        self.compiled(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plaze_transpiler::TranspilerConfig;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_compiled_requires_cache() {
        let engine = CompilingEngine::from_config(&ViewConfig::default()).unwrap();
        assert!(matches!(
            engine.compiled(Path::new("home.plaze.php")),
            Err(ViewError::CacheDisabled)
        ));
    }

    #[test]
    fn test_resolve_compiles_view() {
        let temp = tempdir().unwrap();
        let views = temp.path().join("views");
        fs::create_dir_all(&views).unwrap();
        fs::write(views.join("home.plaze.php"), "{{ $title }}").unwrap();

        let config = ViewConfig::new()
            .with_path(&views)
            .with_transpiler(TranspilerConfig::new().with_cache_dir(temp.path().join("cache")));
        let engine = CompilingEngine::from_config(&config).unwrap();

        let compiled = engine.resolve("home").unwrap();
        assert!(compiled.starts_with(temp.path().join("cache")));
        assert_eq!(
            fs::read_to_string(compiled).unwrap(),
            "<?php echo e($title); ?>"
        );
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let config = ViewConfig::new().with_transpiler(TranspilerConfig::new().with_cache_dir(""));
        assert!(matches!(
            CompilingEngine::from_config(&config),
            Err(ViewError::Transpile(_))
        ));
    }
}
