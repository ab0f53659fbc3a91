//! Header-keyed row records.

use crate::error::{ErrorKind, Result};
use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// The ordered field names of a sheet, shared by every row decoded from it.
#[derive(Debug, PartialEq, Eq)]
pub struct Header {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl Header {
    /// Build a header from raw column names, in column order.
    ///
    /// Empty names must already have been filtered out by the caller (a
    /// column without a name has no field to map to). Repeated names are
    /// disambiguated as `Name`, `Name_1`, `Name_2`, ... so that no column is
    /// silently shadowed.
    pub fn new(raw: impl IntoIterator<Item = impl Into<String>>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();
        for name in raw {
            let name = name.into();
            let mut candidate = name.clone();
            let mut suffix = 0;
            while !seen.insert(candidate.clone()) {
                suffix += 1;
                candidate = format!("{name}_{suffix}");
            }
            names.push(candidate);
        }
        if names.is_empty() {
            exn::bail!(ErrorKind::NoColumns);
        }
        let positions = names.iter().enumerate().map(|(i, n)| (n.clone(), i)).collect();
        Ok(Self { names, positions })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn position(&self, field: &str) -> Option<usize> {
        self.positions.get(field).copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}

/// One data row: an ordered mapping from header field to cell value.
///
/// Always holds exactly one value per header field; cells missing from the
/// source are [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    header: Arc<Header>,
    values: Vec<Value>,
}

impl RowRecord {
    /// Pair values with a header. Short rows are padded with nulls and
    /// surplus values (cells with no header column) are dropped.
    pub fn new(header: Arc<Header>, mut values: Vec<Value>) -> Self {
        values.resize(header.len(), Value::Null);
        Self { header, values }
    }

    /// Look up a field by its (exact) header name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.header.position(field).and_then(|i| self.values.get(i))
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Iterate `(field, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.header.names.iter().map(String::as_str).zip(self.values.iter())
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}

/// A fully decoded sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Arc<Header>,
    rows: Vec<RowRecord>,
}

impl Table {
    pub(crate) fn new(header: Arc<Header>, rows: Vec<RowRecord>) -> Result<Self> {
        if rows.is_empty() {
            exn::bail!(ErrorKind::NoDataRows);
        }
        Ok(Self { header, rows })
    }

    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }

    /// Data rows in file order; index `i` is file row `i + 2`.
    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    pub fn into_parts(self) -> (Arc<Header>, Vec<RowRecord>) {
        (self.header, self.rows)
    }
}
