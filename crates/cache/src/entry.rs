use crate::config::KeyFields;
use crate::index::Indexes;
use rowdex_sheet::{RowRecord, Table, normalize_str};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::time::Instant;

/// A row handed out by the cache. Cloning it never copies cell data.
pub type Row = Arc<RowRecord>;

/// One decoded, indexed source.
#[derive(Debug)]
pub struct CacheEntry {
    source_key: String,
    rows: Vec<Row>,
    indexes: Indexes,
    built_at: Instant,
    built_at_utc: OffsetDateTime,
    approx_bytes: usize,
}

impl CacheEntry {
    /// Index a decoded table. The build time is taken when this returns, so
    /// the TTL counts from the end of the parse.
    pub fn build(source_key: impl Into<String>, table: Table, keys: &KeyFields) -> Self {
        let (header, rows) = table.into_parts();
        let indexes = Indexes::build(&header, &rows, keys);
        let (primary, secondary, combined) = indexes.key_counts();
        tracing::debug!(rows = rows.len(), primary, secondary, combined, "Indexed table");
        let approx_bytes = rows.iter().map(|row| serde_json::to_vec(row).map(|v| v.len()).unwrap_or(0)).sum();
        let rows = rows.into_iter().map(Arc::new).collect();
        Self {
            source_key: source_key.into(),
            rows,
            indexes,
            built_at: Instant::now(),
            built_at_utc: OffsetDateTime::now_utc(),
            approx_bytes,
        }
    }

    pub fn source_key(&self) -> &str {
        &self.source_key
    }

    /// Data rows in file order; index `i` is file row `i + 2`.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Every row matching the given raw (un-normalized) keys, in file order.
    pub fn matches(&self, primary: Option<&str>, secondary: Option<&str>) -> impl Iterator<Item = &Row> {
        let primary = primary.map(normalize_str);
        let secondary = secondary.map(normalize_str);
        self.indexes
            .resolve(primary.as_deref(), secondary.as_deref())
            .iter()
            .filter_map(move |&i| self.rows.get(i))
    }

    /// The first row, in file order, matching the given raw keys.
    pub fn first_match(&self, primary: Option<&str>, secondary: Option<&str>) -> Option<&Row> {
        self.matches(primary, secondary).next()
    }

    /// Wall-clock build time, for reporting only.
    pub fn built_at_utc(&self) -> OffsetDateTime {
        self.built_at_utc
    }

    pub fn age(&self) -> Duration {
        self.built_at.elapsed()
    }

    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.age() < ttl
    }

    /// Sum of the JSON-serialized size of every row.
    pub fn approx_bytes(&self) -> usize {
        self.approx_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowdex_sheet::{Value, decode};

    fn entry(csv: &str) -> CacheEntry {
        let table = decode("fleet.csv", csv.as_bytes()).unwrap();
        CacheEntry::build("fleet.csv", table, &KeyFields::default())
    }

    fn plate(row: &Row) -> Option<&Value> {
        row.get("Plate")
    }

    #[test]
    fn test_first_match_is_first_in_file_order() {
        let entry = entry("Plate,VIN\nAB12,V1\nAB12,V2\nCD34,V3\n");
        assert_eq!(entry.row_count(), 3);
        let first = entry.first_match(Some("ab12"), None).unwrap();
        assert!(Arc::ptr_eq(first, &entry.rows()[0]));
        assert_eq!(entry.matches(Some("AB12"), None).count(), 2);
        assert!(entry.first_match(Some("ZZ99"), None).is_none());
        assert!(entry.first_match(None, None).is_none());
    }

    #[test]
    fn test_match_by_secondary_and_pair() {
        let entry = entry("Plate,VIN\nAB12,V1\nAB12,V2\nCD34,V2\n");
        let row = entry.first_match(None, Some(" v2 ")).unwrap();
        assert_eq!(plate(row), Some(&Value::Text("AB12".to_string())));
        let row = entry.first_match(Some("CD34"), Some("V2")).unwrap();
        assert!(Arc::ptr_eq(row, &entry.rows()[2]));
        // A blank key counts as not given.
        let row = entry.first_match(Some("  "), Some("V1")).unwrap();
        assert!(Arc::ptr_eq(row, &entry.rows()[0]));
    }

    #[test]
    fn test_approx_bytes_is_json_size() {
        let entry = entry("Plate,VIN\nAB12,\n");
        assert_eq!(entry.approx_bytes(), r#"{"Plate":"AB12","VIN":null}"#.len());
    }

    #[tokio::test(start_paused = true)]
    async fn test_freshness() {
        let entry = entry("Plate,VIN\nAB12,V1\n");
        let ttl = Duration::from_secs(60);
        assert!(entry.is_fresh(ttl));
        tokio::time::advance(Duration::from_secs(59)).await;
        assert!(entry.is_fresh(ttl));
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(!entry.is_fresh(ttl));
    }
}
