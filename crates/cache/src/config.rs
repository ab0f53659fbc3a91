use crate::error::{ErrorKind, Result};
use std::time::Duration;

pub(crate) const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub(crate) const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Expiry settings for a [`CacheStore`](crate::CacheStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long an entry stays fresh after it was built.
    pub ttl: Duration,
    /// How often the background sweeper removes stale entries.
    pub sweep_interval: Duration,
}

impl CacheConfig {
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Result<Self> {
        if ttl.is_zero() {
            exn::bail!(ErrorKind::ZeroDuration("ttl"));
        }
        if sweep_interval.is_zero() {
            exn::bail!(ErrorKind::ZeroDuration("sweep interval"));
        }
        Ok(Self { ttl, sweep_interval })
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}

/// Header names of the two business-key columns.
///
/// Matched exactly against the decoded header (no case folding); only the
/// cell values are normalized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFields {
    pub primary: String,
    pub secondary: String,
}

impl KeyFields {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Result<Self> {
        let primary = primary.into();
        let secondary = secondary.into();
        if primary.trim().is_empty() {
            exn::bail!(ErrorKind::EmptyKeyField("primary"));
        }
        if secondary.trim().is_empty() {
            exn::bail!(ErrorKind::EmptyKeyField("secondary"));
        }
        if primary == secondary {
            exn::bail!(ErrorKind::IdenticalKeyFields(primary));
        }
        Ok(Self { primary, secondary })
    }
}

impl Default for KeyFields {
    fn default() -> Self {
        Self {
            primary: "Plate".to_string(),
            secondary: "VIN".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(86_400));
        assert_eq!(config.sweep_interval, Duration::from_secs(600));
        assert_eq!(KeyFields::default(), KeyFields::new("Plate", "VIN").unwrap());
    }

    #[rstest]
    #[case(0, 600, ErrorKind::ZeroDuration("ttl"))]
    #[case(60, 0, ErrorKind::ZeroDuration("sweep interval"))]
    fn test_zero_durations(#[case] ttl: u64, #[case] sweep: u64, #[case] expected: ErrorKind) {
        let err = CacheConfig::new(Duration::from_secs(ttl), Duration::from_secs(sweep)).unwrap_err();
        assert_eq!(*err, expected);
    }

    #[rstest]
    #[case("", "VIN", ErrorKind::EmptyKeyField("primary"))]
    #[case("Plate", "  ", ErrorKind::EmptyKeyField("secondary"))]
    #[case("Plate", "Plate", ErrorKind::IdenticalKeyFields("Plate".to_string()))]
    fn test_invalid_key_fields(#[case] primary: &str, #[case] secondary: &str, #[case] expected: ErrorKind) {
        let err = KeyFields::new(primary, secondary).unwrap_err();
        assert_eq!(*err, expected);
    }
}
