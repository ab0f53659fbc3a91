//! Lookup Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Storage and decoder failures are attached as children
//! of [`SourceUnavailable`](ErrorKind::SourceUnavailable) and
//! [`Decode`](ErrorKind::Decode) respectively.

use derive_more::{Display, Error};

/// A lookup error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for lookup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The source blob couldn't be fetched.
    #[display("source unavailable: {_0}")]
    SourceUnavailable(#[error(not(source))] String),
    /// The source was fetched but isn't a usable spreadsheet.
    #[display("unable to decode source: {_0}")]
    Decode(#[error(not(source))] String),
    /// The requested file row is a header row or past the last data row.
    #[display("row {position} not found in {source_key}")]
    RowNotFound { source_key: String, position: u64 },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// The engine itself never retries; this is for callers deciding whether
    /// to try again later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SourceUnavailable(_))
    }
}
