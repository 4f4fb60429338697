use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing user activity.
#[derive(Default)]
pub struct StudyMetrics {
    documents_loaded: AtomicU64,
    summaries_generated: AtomicU64,
    chunks_summarized: AtomicU64,
    chunk_failures: AtomicU64,
    questions_answered: AtomicU64,
    questions_unanswered: AtomicU64,
}

impl StudyMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successfully extracted document.
    pub fn record_document(&self) {
        self.documents_loaded.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a generated summary with its chunk and failure counts.
    pub fn record_summary(&self, chunk_count: u64, failed_chunks: u64) {
        self.summaries_generated.fetch_add(1, Ordering::Relaxed);
        self.chunks_summarized
            .fetch_add(chunk_count, Ordering::Relaxed);
        self.chunk_failures
            .fetch_add(failed_chunks, Ordering::Relaxed);
    }

    /// Record a question and whether any sentence answered it.
    pub fn record_question(&self, found: bool) {
        if found {
            self.questions_answered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.questions_unanswered.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_loaded: self.documents_loaded.load(Ordering::Relaxed),
            summaries_generated: self.summaries_generated.load(Ordering::Relaxed),
            chunks_summarized: self.chunks_summarized.load(Ordering::Relaxed),
            chunk_failures: self.chunk_failures.load(Ordering::Relaxed),
            questions_answered: self.questions_answered.load(Ordering::Relaxed),
            questions_unanswered: self.questions_unanswered.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of activity counters used for reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Number of PDFs extracted since startup.
    pub documents_loaded: u64,
    /// Number of summaries produced (including short-document sentinels).
    pub summaries_generated: u64,
    /// Total chunks sent to the summarization model.
    pub chunks_summarized: u64,
    /// Chunks whose summarization failed and were replaced by a placeholder.
    pub chunk_failures: u64,
    /// Questions that produced at least one answer sentence.
    pub questions_answered: u64,
    /// Questions for which no sentence cleared the threshold.
    pub questions_unanswered: u64,
}
