//! Business key normalization.
//!
//! The same function is used when building indexes and when resolving
//! lookups, so a key only ever meets other normalized keys.

use crate::value::Value;

/// Canonical form of a cell used as a business key: string form, trimmed,
/// upper-cased. Null and blank cells normalize to `""`, which callers treat as
/// "no key".
pub fn normalize(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Text(s) => normalize_str(s),
        other => normalize_str(&other.to_string()),
    }
}

/// [`normalize`] for keys that arrive as plain strings (e.g. query input).
pub fn normalize_str(value: &str) -> String {
    value.trim().to_uppercase()
}
