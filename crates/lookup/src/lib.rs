//! Row lookups over cached spreadsheet sources.
//!
//! [`Lookup`] is the entry point. Every operation resolves the source through
//! the [cache](rowdex_cache), falling back to fetching it from
//! [storage](rowdex_storage) and decoding it with [`rowdex_sheet`] when it
//! isn't cached or has expired.
//!
//! Row positions are 1-based file row numbers: the header is row 1, so the
//! first data row is 2.

mod engine;
pub mod error;
mod flight;
mod query;
mod warm;

pub use crate::engine::Lookup;
pub use crate::query::KeyQuery;
pub use crate::warm::{WarmOutcome, WarmReport, WarmResult};
pub use rowdex_cache::{CacheStats, Row};
