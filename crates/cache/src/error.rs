//! Cache Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. The cache itself never fails once constructed; only
//! its settings can be rejected.

use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A duration setting was zero.
    #[display("{_0} must be greater than zero")]
    ZeroDuration(#[error(not(source))] &'static str),
    /// A key field name was blank.
    #[display("{_0} key field name is empty")]
    EmptyKeyField(#[error(not(source))] &'static str),
    /// Both key fields name the same column, so the combined index would be
    /// a copy of the other two.
    #[display("primary and secondary key fields are both \"{_0}\"")]
    IdenticalKeyFields(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
