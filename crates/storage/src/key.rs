//! Blob key validation.
//!
//! Keys are `/`-separated and relative to the backend root (a directory for
//! [`LocalBackend`](crate::backend::LocalBackend), a bucket prefix for S3).
//! They must never resolve to somewhere outside of that root.

use crate::error::{ErrorKind, Result};

/// Validates a blob key for security and correctness, returning its
/// normalized form.
///
/// Empty segments and `.` are dropped, `..` pops the previous segment and
/// fails if there is nothing left to pop. Null bytes and backslashes are
/// rejected outright since they mean different things to different backends.
///
/// # Examples
///
/// ```
/// use rowdex_storage::validate_key;
/// // Valid keys
/// assert!(validate_key("fleet/2024/vehicles.xlsx").is_ok());
/// assert!(validate_key("a/../vehicles.xlsx").is_ok()); // (never leaves the root)
/// // Invalid keys
/// assert!(validate_key("../etc/passwd").is_err());
/// assert!(validate_key("a/../../b").is_err());
/// assert!(validate_key("a\0b").is_err());
/// // Keys get resolved
/// assert_eq!(
///     validate_key("wrong/../still-wrong/.././fleet//./vehicles.xlsx/").unwrap(),
///     "fleet/vehicles.xlsx"
/// );
/// ```
pub fn validate(key: impl AsRef<str>) -> Result<String> {
    let key = key.as_ref();
    if key.contains(['\0', '\\']) {
        exn::bail!(ErrorKind::InvalidKey(key.to_string()));
    }
    let mut segments = Vec::new();
    for segment in key.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                if segments.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidKey(key.to_string()));
                }
            },
            normal => segments.push(normal),
        }
    }
    match segments.is_empty() {
        true => exn::bail!(ErrorKind::InvalidKey(key.to_string())),
        false => Ok(segments.join("/")),
    }
}
