//! Read-only HTTP(S) storage backend.
//!
//! Uploaded spreadsheets are usually referenced by the public URL the blob
//! store handed back on upload. This backend fetches those URLs directly.
//! Keys are either absolute `http(s)://` URLs, or paths joined onto an
//! optional base URL.

use crate::StorageBackend;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Read-only backend for blobs addressed by URL.
///
/// # Examples
///
/// ```no_run
/// use rowdex_storage::backend::HttpBackend;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = HttpBackend::new("blobs", Some("https://blob.example.com/fleet/"), Duration::from_secs(30))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    name: String,
    base_url: Option<String>,
    client: Client,
}

impl HttpBackend {
    /// Create a new HTTP backend. A hung fetch fails after `timeout`.
    pub fn new(name: impl Into<String>, base_url: Option<impl Into<String>>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.map(Into::into);
        if let Some(base) = &base_url
            && !is_absolute_url(base)
        {
            exn::bail!(ErrorKind::InvalidKey(base.clone()));
        }
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ErrorKind::BackendError(format!("unable to build HTTP client: {e}")))?;
        Ok(Self { name: name.into(), base_url, client })
    }

    /// Resolve a key into the URL that gets fetched.
    fn url(&self, key: &str) -> Result<String> {
        if is_absolute_url(key) {
            return Ok(key.to_string());
        }
        match &self.base_url {
            Some(base) => Ok(format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))),
            None => exn::bail!(ErrorKind::InvalidKey(key.to_string())),
        }
    }

    fn unsupported(operation: &str) -> Result<()> {
        exn::bail!(ErrorKind::Unsupported(format!("{operation} over HTTP")))
    }
}

fn is_absolute_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

#[async_trait]
impl StorageBackend for HttpBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let url = self.url(key)?;
        let response = self.client.head(&url).send().await.map_err(|e| ErrorKind::Network(e.to_string()))?;
        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => exn::bail!(ErrorKind::BackendError(format!("HEAD {url} returned {status}"))),
        }
    }

    #[tracing::instrument(level = "debug", skip(self), fields(backend = %self.name))]
    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let url = self.url(key)?;
        let response = self.client.get(&url).send().await.map_err(|e| ErrorKind::Network(e.to_string()))?;
        match response.status() {
            status if status.is_success() => {},
            StatusCode::NOT_FOUND | StatusCode::GONE => exn::bail!(ErrorKind::NotFound(key.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                exn::bail!(ErrorKind::PermissionDenied(key.to_string()))
            },
            status if status.is_server_error() => {
                exn::bail!(ErrorKind::Network(format!("GET {url} returned {status}")))
            },
            status => exn::bail!(ErrorKind::BackendError(format!("GET {url} returned {status}"))),
        }
        let body = response.bytes().await.map_err(|e| ErrorKind::Network(e.to_string()))?;
        Ok(body.to_vec())
    }

    async fn write(&self, key: &str, _data: &[u8]) -> Result<()> {
        tracing::warn!(backend = %self.name, key, "Refusing to write to read-only HTTP backend");
        Self::unsupported("write")
    }

    async fn delete(&self, key: &str) -> Result<()> {
        tracing::warn!(backend = %self.name, key, "Refusing to delete from read-only HTTP backend");
        Self::unsupported("delete")
    }
}
