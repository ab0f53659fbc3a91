use crate::error::{ErrorKind, Result};
use crate::flight::Flights;
use crate::query::KeyQuery;
use exn::{OptionExt, ResultExt};
use rowdex_cache::{CacheEntry, CacheStats, CacheStore, KeyFields, Row};
use rowdex_storage::BackendHandle;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::instrument;

/// Data rows start on file row 2; row 1 is the header.
const FIRST_DATA_ROW: u64 = 2;

/// Row lookups against spreadsheet sources, served from the cache and
/// rebuilt from storage on a miss.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
pub struct Lookup {
    backend: BackendHandle,
    cache: Arc<CacheStore>,
    keys: KeyFields,
    flights: Flights,
}

impl Lookup {
    pub fn new(backend: BackendHandle, cache: Arc<CacheStore>, keys: KeyFields) -> Self {
        Self {
            backend,
            cache,
            keys,
            flights: Flights::default(),
        }
    }

    pub fn cache(&self) -> &Arc<CacheStore> {
        &self.cache
    }

    /// The cached entry for `source_key`, rebuilding it if absent or stale.
    ///
    /// Concurrent misses on the same key wait for a single rebuild instead of
    /// each fetching and decoding the source.
    pub async fn entry(&self, source_key: &str) -> Result<Arc<CacheEntry>> {
        if let Some(entry) = self.cache.get(source_key) {
            return Ok(entry);
        }
        let _flight = self.flights.enter(source_key).await;
        if let Some(entry) = self.cache.get(source_key) {
            tracing::debug!(source = source_key, "Rebuilt while waiting");
            return Ok(entry);
        }
        self.rebuild(source_key).await
    }

    #[instrument(skip(self), fields(backend = self.backend.name(), bytes, rows, elapsed_ms))]
    async fn rebuild(&self, source_key: &str) -> Result<Arc<CacheEntry>> {
        let started = Instant::now();
        let bytes = self
            .backend
            .read(source_key)
            .await
            .or_raise(|| ErrorKind::SourceUnavailable(source_key.to_string()))?;
        tracing::Span::current().record("bytes", bytes.len());

        let source = source_key.to_string();
        let keys = self.keys.clone();
        let built = tokio::task::spawn_blocking(move || {
            let table = rowdex_sheet::decode(&source, &bytes)?;
            Ok::<_, rowdex_sheet::error::Error>(CacheEntry::build(source, table, &keys))
        })
        .await;
        let entry = match built {
            Ok(result) => result.or_raise(|| ErrorKind::Decode(source_key.to_string()))?,
            Err(e) => {
                tracing::error!(source = source_key, error = %e, "Decode task did not complete");
                exn::bail!(ErrorKind::Decode(source_key.to_string()));
            },
        };

        let entry = self.cache.put(entry);
        let elapsed_ms = millis(started);
        tracing::Span::current().record("rows", entry.row_count()).record("elapsed_ms", elapsed_ms);
        tracing::info!(source = source_key, rows = entry.row_count(), elapsed_ms, "Rebuilt cache entry");
        Ok(entry)
    }

    /// The row at 1-based file row `position` (the header is row 1, so the
    /// first data row is 2).
    pub async fn get_row(&self, source_key: &str, position: u64) -> Result<Row> {
        let entry = self.entry(source_key).await?;
        row_at(&entry, position).ok_or_raise(|| ErrorKind::RowNotFound {
            source_key: source_key.to_string(),
            position,
        })
    }

    /// [`get_row`](Self::get_row) for many positions at once: one result per
    /// position, in the same order, with `None` where there is no such row.
    pub async fn get_rows(&self, source_key: &str, positions: &[u64]) -> Result<Vec<Option<Row>>> {
        let entry = self.entry(source_key).await?;
        Ok(positions.iter().map(|&position| row_at(&entry, position)).collect())
    }

    /// The first row (in file order) matching each query, or `None`.
    ///
    /// A query with both keys only matches rows carrying both; a query with
    /// neither matches nothing.
    pub async fn search_rows(&self, source_key: &str, queries: &[KeyQuery]) -> Result<Vec<Option<Row>>> {
        let entry = self.entry(source_key).await?;
        Ok(queries
            .iter()
            .map(|query| entry.first_match(query.primary.as_deref(), query.secondary.as_deref()).cloned())
            .collect())
    }

    pub fn evict(&self, source_key: &str) -> bool {
        self.cache.evict(source_key)
    }

    pub fn clear(&self) -> usize {
        self.cache.clear()
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

fn row_at(entry: &CacheEntry, position: u64) -> Option<Row> {
    let index = usize::try_from(position.checked_sub(FIRST_DATA_ROW)?).ok()?;
    entry.row(index).cloned()
}

pub(crate) fn millis(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}
