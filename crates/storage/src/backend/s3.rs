//! S3-compatible storage backend.
//!
//! This module provides a storage backend implementation for S3-compatible
//! services including AWS S3, Backblaze B2, Tigris (Fly.io), MinIO and others.
//!
//! # Credentials
//!
//! Credentials are provided explicitly via the configuration file.

use crate::error::{ErrorKind, Result};
use crate::{StorageBackend, validate_key};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region, retry::RetryConfig};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Generous default for concurrent S3 requests.
const DEFAULT_CONCURRENT_REQUESTS: usize = 100;

/// S3-compatible storage backend.
///
/// Stores blobs in an S3 bucket, optionally under a key prefix. All keys are
/// relative to the configured prefix (if any).
///
/// # Examples
///
/// ```no_run
/// use rowdex_storage::backend::S3Backend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = S3Backend::new(
///     "uploads",
///     "fleet-uploads",
///     Some("sheets/".to_string()),
///     "us-west-004",
///     Some("https://s3.us-west-004.backblazeb2.com".to_string()),
///     "access_key_id",
///     "secret_access_key",
/// )?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct S3Backend {
    name: String,
    client: Client,
    bucket: String,
    prefix: Option<String>,
    /// Rate limiter for concurrent S3 requests.
    rate_limiter: Arc<Semaphore>,
}

impl S3Backend {
    /// Create a new S3 storage backend.
    ///
    /// # Arguments
    /// * `name` - A name for this backend (used in logging)
    /// * `bucket` - S3 bucket name
    /// * `prefix` - Optional key prefix (acts as virtual directory)
    /// * `region` - AWS region or provider-specific region (e.g., "us-west-004" for Backblaze)
    /// * `endpoint` - Custom endpoint URL for S3-compatible services
    /// * `key_id` - AWS/provider access key ID
    /// * `key_secret` - AWS/provider secret access key
    pub fn new(
        name: impl Into<String>,
        bucket: impl Into<String>,
        prefix: Option<String>,
        region: impl Into<String>,
        endpoint: Option<impl Into<String>>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
    ) -> Result<Self> {
        let prefix = prefix.map(validate_key).transpose()?;
        let credentials = Credentials::new(key_id, key_secret, None, None, "rowdex-config");
        let mut config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(region.into()))
            // Configure retry policy with exponential backoff (1 initial + 3 retries)
            .retry_config(RetryConfig::standard().with_max_attempts(4))
            // Use path-style addressing for better compatibility with
            // S3-compatible services (Backblaze, MinIO, etc.)
            .force_path_style(true);
        if let Some(endpoint_url) = endpoint {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }
        Ok(Self {
            name: name.into(),
            client: Client::from_conf(config_builder.build()),
            bucket: bucket.into(),
            prefix,
            rate_limiter: Arc::new(Semaphore::new(DEFAULT_CONCURRENT_REQUESTS)),
        })
    }

    /// Construct the full S3 object key from a relative blob key.
    fn full_key(&self, key: &str) -> Result<String> {
        Ok(join_prefix(self.prefix.as_deref(), &validate_key(key)?))
    }

    /// Acquire a rate limiter permit before making an S3 API call.
    async fn acquire_permit(&self) -> Result<OwnedSemaphorePermit> {
        // The semaphore is never closed, but there's no reason to panic if it ever is.
        self.rate_limiter
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| exn::Exn::from(ErrorKind::BackendError("S3 rate limiter closed".to_string())))
    }

    fn map_sdk_error<E, R>(err: SdkError<E, R>, key: &str) -> ErrorKind
    where
        E: ProvideErrorMetadata + std::fmt::Debug,
        R: std::fmt::Debug,
    {
        match &err {
            SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => ErrorKind::Network(format!("{err:?}")),
            SdkError::ServiceError(service) => match service.err().code() {
                Some("NoSuchKey" | "NotFound") => ErrorKind::NotFound(key.to_string()),
                Some("AccessDenied" | "Forbidden") => ErrorKind::PermissionDenied(key.to_string()),
                code => ErrorKind::BackendError(format!("S3 error {}: {:?}", code.unwrap_or("unknown"), service.err())),
            },
            _ => ErrorKind::BackendError(format!("{err:?}")),
        }
    }
}

fn join_prefix(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}/{}", prefix.trim_end_matches('/'), key),
        None => key.to_string(),
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let full_key = self.full_key(key)?;
        let _permit = self.acquire_permit().await?;
        match self.client.head_object().bucket(&self.bucket).key(&full_key).send().await {
            Ok(_) => Ok(true),
            Err(err) => match Self::map_sdk_error(err, key) {
                ErrorKind::NotFound(_) => Ok(false),
                other => Err(other.into()),
            },
        }
    }

    #[tracing::instrument(level = "debug", skip(self), fields(backend = %self.name, bucket = %self.bucket))]
    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let full_key = self.full_key(key)?;
        let _permit = self.acquire_permit().await?;
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, key))?;
        let body = output.body.collect().await.map_err(|e| ErrorKind::Network(e.to_string()))?;
        Ok(body.into_bytes().to_vec())
    }

    async fn write(&self, key: &str, data: &[u8]) -> Result<()> {
        let full_key = self.full_key(key)?;
        let _permit = self.acquire_permit().await?;
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, key))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        // S3 happily "deletes" objects that never existed, but the trait
        // promises NotFound.
        if !self.exists(key).await? {
            exn::bail!(ErrorKind::NotFound(key.to_string()));
        }
        let full_key = self.full_key(key)?;
        let _permit = self.acquire_permit().await?;
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&full_key)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, key))?;
        Ok(())
    }
}
