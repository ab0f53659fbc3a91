//! In-memory cache of decoded spreadsheets.
//!
//! Every cached source is held as one immutable [`CacheEntry`]: the decoded
//! rows plus three multimaps over the configured business keys. Entries are
//! never patched; a rebuild replaces the whole entry and readers holding the
//! old `Arc` keep a consistent view until they drop it.
//!
//! # Freshness
//! An entry is fresh while its age is below the configured TTL. The
//! [`CacheStore`] checks freshness on every read, so a stale entry is
//! invisible immediately even if the periodic sweep hasn't removed it yet.

mod config;
mod entry;
pub mod error;
mod index;
mod store;

pub use crate::config::{CacheConfig, KeyFields};
pub use crate::entry::{CacheEntry, Row};
pub use crate::store::{CacheStats, CacheStore, EntryStats, Sweeper};
