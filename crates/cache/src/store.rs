use crate::config::CacheConfig;
use crate::entry::CacheEntry;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use time::format_description::well_known::Rfc3339;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::instrument;

/// Source key to entry map with a fixed TTL.
///
/// Reads and writes are synchronous; a cache hit never suspends. Entries are
/// only ever inserted or removed whole.
#[derive(Debug)]
pub struct CacheStore {
    config: CacheConfig,
    entries: RwLock<HashMap<String, Arc<CacheEntry>>>,
}

impl CacheStore {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    // A panic while holding the lock can't leave the map half-written (every
    // mutation is a single insert/remove/retain), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<CacheEntry>>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<CacheEntry>>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The entry for `key`, if present and still fresh. Stale entries are
    /// left in place for the sweeper.
    pub fn get(&self, key: &str) -> Option<Arc<CacheEntry>> {
        self.read().get(key).filter(|entry| entry.is_fresh(self.config.ttl)).cloned()
    }

    /// Store an entry, replacing any previous entry for the same source.
    pub fn put(&self, entry: CacheEntry) -> Arc<CacheEntry> {
        let entry = Arc::new(entry);
        let key = entry.source_key().to_string();
        tracing::debug!(source = %key, rows = entry.row_count(), bytes = entry.approx_bytes(), "Caching entry");
        self.write().insert(key, entry.clone());
        entry
    }

    /// Remove one entry. Returns whether anything was removed.
    pub fn evict(&self, key: &str) -> bool {
        let removed = self.write().remove(key).is_some();
        tracing::debug!(source = key, removed, "Evicted entry");
        removed
    }

    /// Remove every entry, returning how many there were.
    pub fn clear(&self) -> usize {
        let removed = {
            let mut entries = self.write();
            let count = entries.len();
            entries.clear();
            count
        };
        tracing::info!(removed, "Cleared cache");
        removed
    }

    /// Remove every entry [`get`](Self::get) would no longer return.
    #[instrument(skip(self), fields(removed))]
    pub fn sweep(&self) -> usize {
        let ttl = self.config.ttl;
        let removed = {
            let mut entries = self.write();
            let before = entries.len();
            entries.retain(|_, entry| entry.is_fresh(ttl));
            before - entries.len()
        };
        tracing::Span::current().record("removed", removed);
        if removed > 0 {
            tracing::info!(removed, "Swept stale entries");
        }
        removed
    }

    /// Number of entries held, fresh or not.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Aggregate figures over every entry held, including stale entries the
    /// sweeper hasn't reached yet.
    pub fn stats(&self) -> CacheStats {
        let ttl = self.config.ttl;
        let mut entries: Vec<EntryStats> = self
            .read()
            .values()
            .map(|entry| {
                let age = entry.age();
                EntryStats {
                    source_key: entry.source_key().to_string(),
                    rows: entry.row_count(),
                    approx_bytes: entry.approx_bytes(),
                    age_secs: age.as_secs(),
                    remaining_secs: ttl.saturating_sub(age).as_secs(),
                    built_at: entry.built_at_utc().format(&Rfc3339).unwrap_or_default(),
                }
            })
            .collect();
        entries.sort_by(|a, b| a.source_key.cmp(&b.source_key));
        CacheStats {
            total_files: entries.len(),
            total_rows: entries.iter().map(|e| e.rows).sum(),
            approx_memory_bytes: entries.iter().map(|e| e.approx_bytes).sum(),
            ttl_secs: ttl.as_secs(),
            entries,
        }
    }

    /// Start the periodic sweep on the current tokio runtime.
    ///
    /// The task only holds a weak reference: it ends by itself once the store
    /// is dropped, and is aborted when the returned [`Sweeper`] is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> Sweeper {
        let store = Arc::downgrade(self);
        let period = self.config.sweep_interval;
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(store) = store.upgrade() else {
                    tracing::debug!("Cache store dropped; stopping sweeper");
                    break;
                };
                store.sweep();
            }
        });
        Sweeper { handle }
    }
}

/// Guard for the background sweep task.
#[derive(Debug)]
pub struct Sweeper {
    handle: JoinHandle<()>,
}

impl Sweeper {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_files: usize,
    pub total_rows: usize,
    pub approx_memory_bytes: usize,
    pub ttl_secs: u64,
    pub entries: Vec<EntryStats>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryStats {
    pub source_key: String,
    pub rows: usize,
    pub approx_bytes: usize,
    pub age_secs: u64,
    pub remaining_secs: u64,
    /// RFC 3339, UTC.
    pub built_at: String,
}
