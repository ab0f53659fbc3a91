//! Decoding Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A decoding error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a byte stream could not be turned into a [`Table`](crate::Table).
///
/// None of these are worth retrying with the same bytes.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Neither the source key nor the leading bytes identify a tabular format.
    #[display("unrecognised tabular format: {_0}")]
    UnknownFormat(#[error(not(source))] String),
    /// The bytes claim to be a known format but could not be read as one.
    #[display("invalid or corrupted tabular container")]
    InvalidContainer,
    /// The workbook contains no worksheets.
    #[display("workbook has no sheets")]
    NoSheets,
    /// The first sheet declares no usable cell range.
    #[display("sheet has no usable range")]
    EmptyRange,
    /// The used range does not start on row 1, so there is no header row.
    #[display("sheet has no header row")]
    MissingHeader,
    /// The header row exists but names no columns.
    #[display("header row names no columns")]
    NoColumns,
    /// The sheet has a header but no data rows.
    #[display("sheet has no data rows")]
    NoDataRows,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}
