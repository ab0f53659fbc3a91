//! Business-key multimaps.

use crate::config::KeyFields;
use rowdex_sheet::{Header, RowRecord, normalize};
use std::collections::HashMap;

/// Primary, secondary and combined key indexes over one source's rows.
///
/// Each index maps a normalized key to the positions (into the entry's row
/// list) of every row carrying it, in file order. A key is either absent or
/// maps to at least one row. Blank keys are never indexed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Indexes {
    primary: HashMap<String, Vec<usize>>,
    secondary: HashMap<String, Vec<usize>>,
    // primary -> secondary -> rows, so lookups don't allocate a tuple key.
    combined: HashMap<String, HashMap<String, Vec<usize>>>,
}

impl Indexes {
    /// Build all three indexes in a single pass over `rows`.
    ///
    /// A key field missing from the header is logged and leaves its index
    /// (and the combined index) empty; the rows are still served by position.
    pub fn build<'a>(header: &Header, rows: impl IntoIterator<Item = &'a RowRecord>, keys: &KeyFields) -> Self {
        let primary_column = column(header, &keys.primary, "primary");
        let secondary_column = column(header, &keys.secondary, "secondary");

        let mut indexes = Self::default();
        for (position, row) in rows.into_iter().enumerate() {
            let primary = key(row, primary_column);
            let secondary = key(row, secondary_column);
            if let Some(p) = &primary {
                indexes.primary.entry(p.clone()).or_default().push(position);
            }
            if let Some(s) = &secondary {
                indexes.secondary.entry(s.clone()).or_default().push(position);
            }
            if let (Some(p), Some(s)) = (primary, secondary) {
                indexes.combined.entry(p).or_default().entry(s).or_default().push(position);
            }
        }
        indexes
    }

    /// Row positions for a normalized primary key.
    pub fn primary(&self, key: &str) -> &[usize] {
        self.primary.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Row positions for a normalized secondary key.
    pub fn secondary(&self, key: &str) -> &[usize] {
        self.secondary.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Row positions for a normalized `(primary, secondary)` pair.
    pub fn combined(&self, primary: &str, secondary: &str) -> &[usize] {
        self.combined
            .get(primary)
            .and_then(|inner| inner.get(secondary))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolve a lookup against the most specific index its keys allow.
    ///
    /// Keys must already be normalized; `None` or `""` means "not given".
    /// With neither key given there is nothing to resolve and the result is
    /// empty.
    pub fn resolve(&self, primary: Option<&str>, secondary: Option<&str>) -> &[usize] {
        let primary = primary.filter(|k| !k.is_empty());
        let secondary = secondary.filter(|k| !k.is_empty());
        match (primary, secondary) {
            (Some(p), Some(s)) => self.combined(p, s),
            (Some(p), None) => self.primary(p),
            (None, Some(s)) => self.secondary(s),
            (None, None) => &[],
        }
    }

    /// Number of distinct keys in the primary, secondary and combined indexes.
    pub fn key_counts(&self) -> (usize, usize, usize) {
        let combined = self.combined.values().map(HashMap::len).sum();
        (self.primary.len(), self.secondary.len(), combined)
    }
}

fn column(header: &Header, field: &str, which: &'static str) -> Option<usize> {
    let position = header.position(field);
    if position.is_none() {
        tracing::warn!(field, index = which, "Key field not found in header; index will be empty");
    }
    position
}

fn key(row: &RowRecord, column: Option<usize>) -> Option<String> {
    let value = row.values().get(column?)?;
    Some(normalize(value)).filter(|k| !k.is_empty())
}
