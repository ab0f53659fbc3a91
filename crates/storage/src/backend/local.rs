//! Local filesystem storage backend.
//!
//! Blobs are stored as files under a configured directory and accessed using
//! `tokio::fs` for async I/O.

use crate::error::{ErrorKind, Result};
use crate::{StorageBackend, validate_key};
use async_trait::async_trait;
use std::fs::create_dir_all as sync_create_dir;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem storage backend.
///
/// Stores blobs in a directory on the local filesystem. All keys are relative
/// to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use rowdex_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = LocalBackend::new("local", "/srv/fleet/uploads")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    name: String,
    /// Root directory blobs live under
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute, or exists but is not a
    /// directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidKey(root.display().to_string()));
        }
        if root.exists() {
            if !root.is_dir() {
                exn::bail!(ErrorKind::InvalidKey(root.display().to_string()));
            }
        } else {
            // Use non-async here; it'll only happen once on startup and it's
            // not worth the hassle of making the constructor async.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root.display().to_string()))?;
        }
        Ok(Self { name: name.into(), root })
    }

    /// Get the absolute path for a blob key.
    fn absolute_path(&self, key: &str) -> Result<PathBuf> {
        Ok(self.root.join(validate_key(key)?))
    }

    fn map_io_error(e: std::io::Error, key: &str) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(key.to_string()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(key.to_string()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.absolute_path(key)?;
        Ok(fs::try_exists(&path).await.map_err(ErrorKind::Io)?)
    }

    #[tracing::instrument(level = "debug", skip(self), fields(backend = %self.name))]
    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.absolute_path(key)?;
        Ok(fs::read(&path).await.map_err(|e| Self::map_io_error(e, key))?)
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        let path = self.absolute_path(key)?;
        // Create parent directories if needed, to keep behaviour
        // consistent with S3-compatible storage.
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, key))?;
        }
        Ok(fs::write(&path, data).await.map_err(|e| Self::map_io_error(e, key))?)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.absolute_path(key)?;
        Ok(fs::remove_file(&path).await.map_err(|e| Self::map_io_error(e, key))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("name", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("name", "relative/path").is_err());
        assert!(LocalBackend::new("name", "./relative").is_err());
    }

    #[test]
    fn test_new_creates_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("uploads");
        LocalBackend::new("name", &root).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let expected = temp_dir.path().join("fleet/vehicles.xlsx");
        assert_eq!(backend.absolute_path("fleet/vehicles.xlsx").unwrap(), expected);
        // Key traversal is prevented
        assert!(backend.absolute_path("../etc/passwd").is_err());
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        backend.write("sheet.csv", b"Plate,VIN\n").await.unwrap();
        assert_eq!(backend.read("sheet.csv").await.unwrap(), b"Plate,VIN\n");
    }

    #[tokio::test]
    async fn test_write_creates_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        backend.write("a/b/c/sheet.xlsx", b"data").await.unwrap();
        assert!(backend.exists("a/b/c/sheet.xlsx").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        let err = backend.read("missing.xlsx").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(key) if key == "missing.xlsx"));
    }

    #[tokio::test]
    async fn test_delete() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        backend.write("sheet.xlsx", b"data").await.unwrap();
        backend.delete("sheet.xlsx").await.unwrap();
        assert!(!backend.exists("sheet.xlsx").await.unwrap());
        // Deleting nonexistent blob returns error
        let err = backend.delete("sheet.xlsx").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_key_security() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("name", temp_dir.path()).unwrap();
        // Attempts to escape the root should fail
        assert!(backend.read("../etc/passwd").await.is_err());
        assert!(backend.read("etc/../../passwd").await.is_err());
        assert!(backend.write("../etc/passwd", b"data").await.is_err());
        assert!(backend.delete("../../file").await.is_err());
    }
}
