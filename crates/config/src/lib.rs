//! Layered configuration for rowdex.
//!
//! Settings are read, lowest priority first, from:
//! 1. built-in defaults,
//! 2. a config file (TOML, YAML or JSON, picked by extension), either given
//!    explicitly or found in the platform config directory,
//! 3. `ROWDEX_` environment variables, with `__` separating nested keys
//!    (`ROWDEX_CACHE__TTL_SECS=3600`).

pub mod error;
mod storage;

pub use crate::storage::StorageConfig;
use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Toml, Yaml};
use rowdex_cache::{CacheConfig, KeyFields};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "ROWDEX_";
const DEFAULT_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheSettings,
    pub keys: KeySettings,
    pub storage: StorageConfig,
    /// Source keys warmed at startup, in order.
    pub warm: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            ttl_secs: defaults.ttl.as_secs(),
            sweep_interval_secs: defaults.sweep_interval.as_secs(),
        }
    }
}

/// Header names of the business-key columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySettings {
    pub primary: String,
    pub secondary: String,
}

impl Default for KeySettings {
    fn default() -> Self {
        let defaults = KeyFields::default();
        Self {
            primary: defaults.primary,
            secondary: defaults.secondary,
        }
    }
}

impl Config {
    /// Load and validate the configuration.
    ///
    /// An explicit `path` must exist. Without one, the default location is
    /// used if there's a file there, and skipped silently otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::from_figment(Self::figment(path)?)?;
        config.validate()?;
        Ok(config)
    }

    /// The provider stack, before extraction.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let figment = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => merge_file(Figment::new(), path)?,
            None => match default_path() {
                Some(path) if path.is_file() => merge_file(Figment::new(), &path)?,
                _ => Figment::new(),
            },
        };
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        Ok(figment.extract().map_err(|e| ErrorKind::Load(e.to_string()))?)
    }

    pub fn validate(&self) -> Result<()> {
        self.cache_config()?;
        self.key_fields()?;
        self.storage.validate()
    }

    pub fn cache_config(&self) -> Result<CacheConfig> {
        CacheConfig::new(
            Duration::from_secs(self.cache.ttl_secs),
            Duration::from_secs(self.cache.sweep_interval_secs),
        )
        .or_raise(|| ErrorKind::Invalid("cache".to_string()))
    }

    pub fn key_fields(&self) -> Result<KeyFields> {
        KeyFields::new(&self.keys.primary, &self.keys.secondary).or_raise(|| ErrorKind::Invalid("keys".to_string()))
    }
}

/// Platform config file location, e.g. `~/.config/rowdex/config.toml`.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "rowdex").map(|dirs| dirs.config_dir().join(DEFAULT_FILE_NAME))
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    tracing::debug!(path = %path.display(), "Loading config file");
    let extension = path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase);
    Ok(match extension.as_deref() {
        Some("toml") => figment.merge(Toml::file_exact(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
        Some("json") => figment.merge(Json::file_exact(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;
    use std::io::Write;

    fn load_str(extension: &str, contents: &str) -> Result<Config> {
        let mut file = tempfile::Builder::new().suffix(&format!(".{extension}")).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        let config = Config::from_figment(merge_file(Figment::new(), file.path())?)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_figment(Figment::new()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.cache.ttl_secs, 86_400);
        assert_eq!(config.cache.sweep_interval_secs, 600);
        assert_eq!(config.keys.primary, "Plate");
        assert_eq!(config.keys.secondary, "VIN");
        assert_eq!(config.storage.kind(), "http");
        assert!(config.warm.is_empty());
        config.validate().unwrap();
    }

    #[rstest]
    #[case("toml", "warm = [\"a.xlsx\"]\n[cache]\nttl_secs = 60\n[storage]\nkind = \"local\"\nroot = \"/srv/uploads\"\n")]
    #[case("yaml", "warm: [a.xlsx]\ncache:\n  ttl_secs: 60\nstorage:\n  kind: local\n  root: /srv/uploads\n")]
    #[case("yml", "warm: [a.xlsx]\ncache:\n  ttl_secs: 60\nstorage:\n  kind: local\n  root: /srv/uploads\n")]
    #[case("json", r#"{"warm": ["a.xlsx"], "cache": {"ttl_secs": 60}, "storage": {"kind": "local", "root": "/srv/uploads"}}"#)]
    fn test_file_formats(#[case] extension: &str, #[case] contents: &str) {
        let config = load_str(extension, contents).unwrap();
        assert_eq!(config.cache.ttl_secs, 60);
        // Unset fields in a section keep their defaults.
        assert_eq!(config.cache.sweep_interval_secs, 600);
        assert_eq!(config.storage, StorageConfig::Local { root: PathBuf::from("/srv/uploads") });
        assert_eq!(config.warm, ["a.xlsx"]);
    }

    #[test]
    fn test_s3_storage() {
        let contents = "[storage]\nkind = \"s3\"\nbucket = \"fleet\"\nregion = \"eu-west-2\"\naccess_key_id = \"id\"\nsecret_access_key = \"secret\"\n";
        let config = load_str("toml", contents).unwrap();
        let StorageConfig::S3 { bucket, region, prefix, endpoint, .. } = config.storage else {
            panic!("expected s3 storage");
        };
        assert_eq!(bucket, "fleet");
        assert_eq!(region, "eu-west-2");
        assert_eq!(prefix, None);
        assert_eq!(endpoint, None);
    }

    #[rstest]
    #[case("[cache]\nttl_secs = 0\n")]
    #[case("[cache]\nsweep_interval_secs = 0\n")]
    #[case("[keys]\nprimary = \"\"\n")]
    #[case("[keys]\nprimary = \"VIN\"\n")]
    #[case("[storage]\nkind = \"local\"\nroot = \"relative\"\n")]
    fn test_invalid(#[case] contents: &str) {
        let err = load_str("toml", contents).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)), "{err:?}");
    }

    #[test]
    fn test_unparseable() {
        let err = load_str("toml", "[storage]\nkind = \"ftp\"\n").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Load(_)));
        let err = load_str("toml", "[cache]\nttl_secs = \"soon\"\n").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Load(_)));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_str("ini", "ttl = 1").unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file("rowdex.toml", "[cache]\nttl_secs = 60\nsweep_interval_secs = 5\n[keys]\nprimary = \"Reg\"\n")?;
            jail.set_env("ROWDEX_CACHE__TTL_SECS", 120);
            jail.set_env("ROWDEX_STORAGE__KIND", "local");
            jail.set_env("ROWDEX_STORAGE__ROOT", "/srv/uploads");
            let config = Config::load(Some(Path::new("rowdex.toml"))).unwrap();
            assert_eq!(config.cache.ttl_secs, 120);
            assert_eq!(config.cache.sweep_interval_secs, 5);
            assert_eq!(config.keys.primary, "Reg");
            assert_eq!(config.keys.secondary, "VIN");
            assert_eq!(config.storage.kind(), "local");
            Ok(())
        });
    }
}
