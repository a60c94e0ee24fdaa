//! Compiled artifact locations and staleness checks.
//!
//! Every source path maps to one file in the cache directory, named after a
//! SHA-256 digest of the path string. The mapping is pure, so the resolver
//! can be shared freely between threads.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::TranspileResult;
use crate::fs::Filesystem;

/// Hex digest identifying a source path in the cache.
pub fn hash_path(path: &Path) -> String {
    let digest = Sha256::digest(path.to_string_lossy().as_bytes());
    hex::encode(digest)
}

/// Resolver for compiled artifact paths.
#[derive(Clone)]
pub struct CompiledCache {
    cache_dir: PathBuf,
    extension: String,
    files: Arc<dyn Filesystem>,
}

impl CompiledCache {
    /// Create a resolver rooted at `cache_dir`.
    pub fn new(
        cache_dir: impl Into<PathBuf>,
        extension: impl Into<String>,
        files: Arc<dyn Filesystem>,
    ) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            extension: extension.into(),
            files,
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Path of the compiled artifact for `source`.
    pub fn compiled_path_for(&self, source: &Path) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}", hash_path(source), self.extension))
    }

    /// Whether the compiled artifact for `source` must be regenerated.
    ///
    /// A missing artifact is always stale. Otherwise the artifact is stale
    /// unless the source is strictly older than it, so equal timestamps
    /// trigger a rebuild.
    pub fn is_stale(&self, source: &Path) -> TranspileResult<bool> {
        let compiled = self.compiled_path_for(source);

        if !self.files.exists(&compiled) {
            debug!("No compiled artifact for {:?}", source);
            return Ok(true);
        }

        let stale = self.files.modified(source)? >= self.files.modified(&compiled)?;
        debug!("Compiled artifact for {:?} stale: {}", source, stale);
        Ok(stale)
    }
}

impl fmt::Debug for CompiledCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCache")
            .field("cache_dir", &self.cache_dir)
            .field("extension", &self.extension)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranspileError;
    use crate::fs::MockFilesystem;
    use std::io;
    use std::time::{Duration, SystemTime};

    fn cache_with(files: MockFilesystem) -> CompiledCache {
        CompiledCache::new("/var/cache/views", "php", Arc::new(files))
    }

    fn mtimes(source: SystemTime, compiled: SystemTime) -> MockFilesystem {
        let mut files = MockFilesystem::new();
        files.expect_exists().returning(|_| true);
        files.expect_modified().returning(move |path| {
            if path.starts_with("/var/cache/views") {
                Ok(compiled)
            } else {
                Ok(source)
            }
        });
        files
    }

    #[test]
    fn test_compiled_path_is_deterministic() {
        let cache = cache_with(MockFilesystem::new());
        let source = Path::new("views/home.plaze.php");

        let first = cache.compiled_path_for(source);
        assert_eq!(first, cache.compiled_path_for(source));
        assert!(first.starts_with("/var/cache/views"));
        assert_eq!(first.extension().unwrap(), "php");
        assert_eq!(
            first.file_stem().unwrap().to_string_lossy(),
            hash_path(source)
        );
    }

    #[test]
    fn test_distinct_sources_get_distinct_paths() {
        let cache = cache_with(MockFilesystem::new());
        assert_ne!(
            cache.compiled_path_for(Path::new("views/a.plaze.php")),
            cache.compiled_path_for(Path::new("views/b.plaze.php"))
        );
    }

    #[test]
    fn test_missing_artifact_is_stale() {
        let mut files = MockFilesystem::new();
        files.expect_exists().returning(|_| false);
        files.expect_modified().never();

        let cache = cache_with(files);
        assert!(cache.is_stale(Path::new("views/home.plaze.php")).unwrap());
    }

    #[test]
    fn test_equal_mtimes_are_stale() {
        let now = SystemTime::now();
        let cache = cache_with(mtimes(now, now));
        assert!(cache.is_stale(Path::new("views/home.plaze.php")).unwrap());
    }

    #[test]
    fn test_older_source_is_fresh() {
        let now = SystemTime::now();
        let cache = cache_with(mtimes(now - Duration::from_secs(60), now));
        assert!(!cache.is_stale(Path::new("views/home.plaze.php")).unwrap());
    }

    #[test]
    fn test_newer_source_is_stale() {
        let now = SystemTime::now();
        let cache = cache_with(mtimes(now, now - Duration::from_secs(60)));
        assert!(cache.is_stale(Path::new("views/home.plaze.php")).unwrap());
    }

    #[test]
    fn test_missing_source_propagates_io_error() {
        let mut files = MockFilesystem::new();
        files.expect_exists().returning(|_| true);
        files
            .expect_modified()
            .returning(|_| Err(io::Error::new(io::ErrorKind::NotFound, "gone")));

        let cache = cache_with(files);
        let err = cache.is_stale(Path::new("views/gone.plaze.php")).unwrap_err();
        assert!(matches!(err, TranspileError::Io(_)));
    }
}
