//! In-memory storage backend for testing.

use crate::error::{ErrorKind, Result};
use crate::{StorageBackend, validate_key};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory storage backend for testing.
///
/// Blobs are stored in a `HashMap` behind a [`RwLock`], so all trait methods
/// can operate on `&self` without external synchronisation. Every call to
/// [`read`](StorageBackend::read) is counted, which lets tests assert how
/// often a cache actually went back to storage.
///
/// # Examples
///
/// ```
/// use rowdex_storage::backend::{MockBackend, StorageBackend};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([
///     ("fleet/vehicles.csv", b"Plate,VIN\n"),
/// ]);
/// assert!(backend.exists("fleet/vehicles.csv").await?);
///
/// backend.write("fleet/drivers.csv", b"Name\n").await?;
/// assert!(backend.exists("fleet/drivers.csv").await?);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<HashMap<String, Vec<u8>>>,
    reads: AtomicUsize,
}

impl MockBackend {
    /// Create a mock backend pre-populated with blobs.
    ///
    /// Panics if any key fails validation (e.g. key traversal). If test setup
    /// is wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = HashMap::new();
        for (key, data) in files {
            let key = key.into();
            let Ok(validated) = validate_key(&key) else {
                // The panic here is DELIBERATE. MockBackend is intended to be
                // used in tests; panics are expected. There is no error result.
                panic!("MockBackend::with_files: invalid key {key}");
            };
            map.insert(validated, data.into());
        }
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(map),
            reads: AtomicUsize::new(0),
        }
    }

    /// Number of [`read`](StorageBackend::read) calls made so far, including
    /// ones that failed.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let key = validate_key(key)?;
        Ok(self.storage.read().await.contains_key(&key))
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let key = validate_key(key)?;
        self.storage.read().await.get(&key).cloned().ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(key)))
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        let key = validate_key(key)?;
        self.storage.write().await.insert(key, data.to_vec());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = validate_key(key)?;
        self.storage.write().await.remove(&key).map(|_| ()).ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(key)))
    }
}
