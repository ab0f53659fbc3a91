//! Blob storage for spreadsheet sources.
//!
//! Sources are opaque byte blobs addressed by a string key. The lookup engine
//! only ever reads them; uploading and deleting happen elsewhere in the
//! application but are part of the same contract so that tests (and tools)
//! can seed a backend.

pub mod backend;
pub mod error;
mod key;

pub use crate::backend::StorageBackend;
pub use crate::key::validate as validate_key;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
