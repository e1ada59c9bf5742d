use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing ingestion activity.
#[derive(Debug, Default)]
pub struct IngestMetrics {
    documents_completed: AtomicU64,
    documents_failed: AtomicU64,
    sentinel_documents: AtomicU64,
    chunks_produced: AtomicU64,
}

impl IngestMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed document, its chunk count, and whether its text was a placeholder.
    pub fn record_completed(&self, chunk_count: u64, sentinel: bool) {
        self.documents_completed.fetch_add(1, Ordering::Relaxed);
        self.chunks_produced
            .fetch_add(chunk_count, Ordering::Relaxed);
        if sentinel {
            self.sentinel_documents.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a document whose processing failed.
    pub fn record_failed(&self) {
        self.documents_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_completed: self.documents_completed.load(Ordering::Relaxed),
            documents_failed: self.documents_failed.load(Ordering::Relaxed),
            sentinel_documents: self.sentinel_documents.load(Ordering::Relaxed),
            chunks_produced: self.chunks_produced.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of ingestion counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Documents processed to completion since startup.
    pub documents_completed: u64,
    /// Documents whose processing failed.
    pub documents_failed: u64,
    /// Completed documents whose only content is a sentinel message.
    pub sentinel_documents: u64,
    /// Total chunks persisted across completed documents.
    pub chunks_produced: u64,
}
