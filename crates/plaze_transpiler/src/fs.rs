//! File access used by the transpiler and its cache.

use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

/// The filesystem operations the transpiler depends on.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Read a whole file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Check whether a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Last modification time of a path.
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;

    /// Write text to a file, replacing any previous content.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;
}

/// [`Filesystem`] backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFilesystem;

impl Filesystem for LocalFilesystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("cache").join("views").join("a.php");

        LocalFilesystem.write(&target, "<?php echo 1; ?>").unwrap();

        assert!(LocalFilesystem.exists(&target));
        assert_eq!(
            LocalFilesystem.read_to_string(&target).unwrap(),
            "<?php echo 1; ?>"
        );
    }

    #[test]
    fn test_modified_missing_path_errors() {
        let temp = tempdir().unwrap();
        let err = LocalFilesystem
            .modified(&temp.path().join("missing.plaze.php"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
