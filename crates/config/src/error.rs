//! Config Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A configuration error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories. None of these go away by retrying; the
/// configuration has to be fixed.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An explicitly requested config file doesn't exist.
    #[display("config file not found: {}", _0.display())]
    NotFound(#[error(not(source))] PathBuf),
    /// The config file extension isn't one of toml, yaml, yml or json.
    #[display("unsupported config file format: {}", _0.display())]
    UnsupportedFormat(#[error(not(source))] PathBuf),
    /// The layered configuration couldn't be parsed into settings.
    #[display("unable to load configuration: {_0}")]
    Load(#[error(not(source))] String),
    /// The settings parsed but don't make sense together.
    #[display("invalid configuration: {_0}")]
    Invalid(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
