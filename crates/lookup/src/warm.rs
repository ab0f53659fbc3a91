//! Proactive cache population.

use crate::engine::{Lookup, millis};
use crate::error::Error;
use serde::Serialize;
use tokio::time::Instant;
use tracing::instrument;

/// What happened to one source during a warm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WarmOutcome {
    /// Fetched, decoded and cached.
    Cached { rows: usize },
    /// Already cached and fresh; nothing was fetched.
    Skipped,
    /// The rebuild failed. Warming carried on with the next source.
    Error { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WarmResult {
    pub source_key: String,
    #[serde(flatten)]
    pub outcome: WarmOutcome,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarmReport {
    pub sources: Vec<WarmResult>,
    pub cached: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed_ms: u64,
}

impl Lookup {
    /// Make sure every source in `source_keys` is cached, one at a time.
    ///
    /// Never fails as a whole: per-source failures are logged and recorded
    /// in the report.
    #[instrument(skip_all, fields(cached, skipped, failed))]
    pub async fn warm<I>(&self, source_keys: I) -> WarmReport
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let started = Instant::now();
        let mut report = WarmReport::default();
        for source_key in source_keys {
            let source_key = source_key.as_ref();
            let source_started = Instant::now();
            let outcome = if self.cache().get(source_key).is_some() {
                report.skipped += 1;
                WarmOutcome::Skipped
            } else {
                match self.entry(source_key).await {
                    Ok(entry) => {
                        report.cached += 1;
                        WarmOutcome::Cached { rows: entry.row_count() }
                    },
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!(source = source_key, error = ?e, "Unable to warm source");
                        WarmOutcome::Error { message: message(&e) }
                    },
                }
            };
            report.sources.push(WarmResult {
                source_key: source_key.to_string(),
                outcome,
                elapsed_ms: millis(source_started),
            });
        }
        report.elapsed_ms = millis(started);

        let span = tracing::Span::current();
        span.record("cached", report.cached).record("skipped", report.skipped).record("failed", report.failed);
        tracing::info!(
            cached = report.cached,
            skipped = report.skipped,
            failed = report.failed,
            elapsed_ms = report.elapsed_ms,
            "Warm complete"
        );
        report
    }
}

/// The error followed by its first cause at each level, e.g.
/// `source unavailable: a.csv: blob not found: a.csv`.
fn message(err: &Error) -> String {
    let mut message = err.to_string();
    let mut frame = err.frame();
    while let Some(child) = frame.children().first() {
        message.push_str(": ");
        message.push_str(&child.error().to_string());
        frame = child;
    }
    message
}
