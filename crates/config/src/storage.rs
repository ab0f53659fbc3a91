use crate::error::{ErrorKind, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Where source blobs are fetched from, tagged by `kind`.
///
/// ```toml
/// [storage]
/// kind = "s3"
/// bucket = "fleet-uploads"
/// prefix = "spreadsheets"
/// region = "eu-west-2"
/// access_key_id = "AKIA..."
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Files under a directory on this machine.
    Local { root: PathBuf },
    /// An S3-compatible bucket. Credentials are always given explicitly;
    /// `ROWDEX_STORAGE__SECRET_ACCESS_KEY` keeps the secret out of the file.
    S3 {
        bucket: String,
        #[serde(default)]
        prefix: Option<String>,
        region: String,
        #[serde(default)]
        endpoint: Option<String>,
        access_key_id: String,
        secret_access_key: String,
    },
    /// Plain HTTP(S) GETs. Source keys that are already absolute URLs are
    /// fetched as-is; anything else is joined onto `base_url`.
    Http {
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default = "default_http_timeout")]
        timeout_secs: u64,
    },
}

fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Http {
            base_url: None,
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl StorageConfig {
    /// Short name used for the backend and in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local { .. } => "local",
            Self::S3 { .. } => "s3",
            Self::Http { .. } => "http",
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::Local { root } if !root.is_absolute() => {
                exn::bail!(ErrorKind::Invalid(format!("storage.root must be absolute: {}", root.display())));
            },
            Self::S3 { bucket, .. } if bucket.trim().is_empty() => {
                exn::bail!(ErrorKind::Invalid("storage.bucket is empty".to_string()));
            },
            Self::S3 { region, .. } if region.trim().is_empty() => {
                exn::bail!(ErrorKind::Invalid("storage.region is empty".to_string()));
            },
            Self::S3 { access_key_id, secret_access_key, .. } if access_key_id.is_empty() || secret_access_key.is_empty() => {
                exn::bail!(ErrorKind::Invalid("storage credentials are empty".to_string()));
            },
            Self::Http { timeout_secs: 0, .. } => {
                exn::bail!(ErrorKind::Invalid("storage.timeout_secs must be greater than zero".to_string()));
            },
            Self::Http { base_url: Some(url), .. } if !(url.starts_with("http://") || url.starts_with("https://")) => {
                exn::bail!(ErrorKind::Invalid(format!("storage.base_url is not an http(s) URL: {url}")));
            },
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn s3(bucket: &str, region: &str, secret: &str) -> StorageConfig {
        StorageConfig::S3 {
            bucket: bucket.to_string(),
            prefix: None,
            region: region.to_string(),
            endpoint: None,
            access_key_id: "id".to_string(),
            secret_access_key: secret.to_string(),
        }
    }

    fn http(base_url: Option<&str>, timeout_secs: u64) -> StorageConfig {
        StorageConfig::Http { base_url: base_url.map(String::from), timeout_secs }
    }

    #[rstest]
    #[case(StorageConfig::default(), true)]
    #[case(StorageConfig::Local { root: PathBuf::from("/srv/uploads") }, true)]
    #[case(StorageConfig::Local { root: PathBuf::from("uploads") }, false)]
    #[case(s3("fleet", "eu-west-2", "secret"), true)]
    #[case(s3("", "eu-west-2", "secret"), false)]
    #[case(s3("fleet", "", "secret"), false)]
    #[case(s3("fleet", "eu-west-2", ""), false)]
    #[case(http(Some("https://blob.example.com/uploads/"), 5), true)]
    #[case(http(Some("ftp://blob.example.com"), 5), false)]
    #[case(http(None, 0), false)]
    fn test_validate(#[case] config: StorageConfig, #[case] valid: bool) {
        assert_eq!(config.validate().is_ok(), valid);
    }
}
