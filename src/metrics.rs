use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing pipeline activity.
#[derive(Default)]
pub struct PipelineMetrics {
    documents_processed: AtomicU64,
    summaries_generated: AtomicU64,
}

impl PipelineMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a document that made it through the full workflow.
    pub fn record_document(&self) {
        self.documents_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a summary served by the summaries endpoint.
    pub fn record_summary(&self) {
        self.summaries_generated.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_processed: self.documents_processed.load(Ordering::Relaxed),
            summaries_generated: self.summaries_generated.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of pipeline counters used for reporting.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents fully processed (extracted, summarized, indexed) since startup.
    pub documents_processed: u64,
    /// Summaries generated on demand since startup.
    pub summaries_generated: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_and_summaries() {
        let metrics = PipelineMetrics::new();
        metrics.record_document();
        metrics.record_summary();
        metrics.record_summary();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_processed, 1);
        assert_eq!(snapshot.summaries_generated, 2);
    }

    #[test]
    fn snapshot_starts_at_zero() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.snapshot().documents_processed, 0);
        assert_eq!(metrics.snapshot().summaries_generated, 0);
    }
}
