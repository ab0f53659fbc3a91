//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, which provides a unified
//! interface for blob operations across different backends (local filesystem,
//! S3-compatible services, plain HTTP blob URLs, etc.).

#[cfg(feature = "http")]
mod http;
mod local;
#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "s3")]
mod s3;

#[cfg(feature = "http")]
pub use self::http::HttpBackend;
pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
#[cfg(feature = "s3")]
pub use self::s3::S3Backend;
use crate::error::Result;
use async_trait::async_trait;

/// Unified interface for blob storage backends.
///
/// All operations are asynchronous to efficiently handle network round trips.
/// Blobs are opaque: a backend never looks inside what it stores. It's a
/// glorified CRUD interface, but in ✨Rust✨
///
/// # Key Handling
/// Keys are relative to the backend root and validated with
/// [`validate_key`](crate::validate_key) before use. Implementations should
/// enforce this validation (the HTTP backend being the exception, since its
/// keys are URLs).
///
/// # Examples
///
/// ```
/// use rowdex_storage::{backend::StorageBackend, error::Result};
///
/// async fn size_of_hardcoded_sheet(backend: &dyn StorageBackend) -> Result<u64> {
///     let key = "fleet/vehicles.xlsx";
///     if backend.exists(key).await? {
///         let data = backend.read(key).await?;
///         Ok(data.len() as u64)
///     } else {
///         Ok(0)
///     }
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend. Used for logging only.
    fn name(&self) -> &str;

    /// Check if a blob exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Read blob contents.
    ///
    /// Returns the complete blob as a [`Vec<u8>`].
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the blob
    /// does not exist.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use rowdex_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let data = backend.read("fleet/vehicles.xlsx").await?;
    /// println!("Read {} bytes", data.len());
    /// # Ok(())
    /// # }
    /// ```
    async fn read(&self, key: &str) -> Result<Vec<u8>>;

    /// Write blob contents.
    ///
    /// Creates a new blob or overwrites an existing one.
    ///
    /// # Notes
    /// - Implementations should create parent directories as needed.
    async fn write(&self, key: &str, data: &[u8]) -> Result<()>;

    /// Delete a blob.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the blob
    /// does not exist.
    async fn delete(&self, key: &str) -> Result<()>;
}
