//! Single-user session state: the current document and its latest summary.

use crate::pdf::ExtractedText;
use crate::processing::chunking::count_words;
use crate::processing::SummaryOutcome;
use serde::Serialize;
use sha2::{Digest, Sha256};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Text extracted from one uploaded PDF. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// SHA-256 of the uploaded bytes, hex encoded.
    pub id: String,
    /// Extracted text, trimmed.
    pub text: String,
    /// Number of pages in the source PDF.
    pub page_count: usize,
    /// Number of whitespace-separated words in `text`.
    pub word_count: usize,
    /// Upload time in RFC 3339.
    pub uploaded_at: String,
}

impl Document {
    /// Wrap extracted text together with the identity of the bytes it came from.
    pub fn new(source: &[u8], extracted: ExtractedText) -> Self {
        let word_count = count_words(&extracted.text);
        Self {
            id: compute_document_id(source),
            text: extracted.text,
            page_count: extracted.page_count,
            word_count,
            uploaded_at: current_timestamp_rfc3339(),
        }
    }

    /// First `max_chars` characters of the text, with `...` appended when truncated.
    pub fn preview(&self, max_chars: usize) -> String {
        match self.text.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &self.text[..cut]),
            None => self.text.clone(),
        }
    }
}

/// Session data held across user interactions.
#[derive(Debug, Default)]
pub struct Session {
    document: Option<Document>,
    summary: Option<SummaryOutcome>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current document, if one was uploaded.
    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Latest summary of the current document, if one was generated.
    pub fn summary(&self) -> Option<&SummaryOutcome> {
        self.summary.as_ref()
    }

    /// Replace the current document. Any summary of the previous document is discarded.
    pub fn set_document(&mut self, document: Document) {
        tracing::debug!(document_id = %document.id, "Session document replaced");
        self.document = Some(document);
        self.summary = None;
    }

    /// Store the summary of `document_id`, overwriting the previous one.
    ///
    /// Returns `false` (and stores nothing) when the session moved on to another document while
    /// the summary was being generated.
    pub fn set_summary(&mut self, document_id: &str, summary: SummaryOutcome) -> bool {
        match &self.document {
            Some(document) if document.id == document_id => {
                self.summary = Some(summary);
                true
            }
            _ => false,
        }
    }
}

fn compute_document_id(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("1970-01-01T00:00:00Z"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(text: &str) -> Document {
        Document::new(
            text.as_bytes(),
            ExtractedText {
                text: text.to_string(),
                page_count: 1,
            },
        )
    }

    fn summary(text: &str) -> SummaryOutcome {
        SummaryOutcome {
            summary: text.into(),
            chunk_count: 1,
            failed_chunks: 0,
            too_short: false,
        }
    }

    #[test]
    fn document_id_is_deterministic_digest() {
        let first = document("same bytes");
        let second = document("same bytes");
        assert_eq!(first.id, second.id);
        assert_eq!(first.id.len(), 64);
        assert_ne!(first.id, document("other bytes").id);
    }

    #[test]
    fn document_counts_words() {
        assert_eq!(document("one two  three\nfour").word_count, 4);
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let doc = document("héllo wörld");
        assert_eq!(doc.preview(5), "héllo...");
        assert_eq!(doc.preview(100), "héllo wörld");
        assert_eq!(doc.preview(11), "héllo wörld");
    }

    #[test]
    fn new_document_clears_previous_summary() {
        let mut session = Session::new();
        let first = document("first");
        let first_id = first.id.clone();
        session.set_document(first);
        assert!(session.set_summary(&first_id, summary("s1")));
        assert_eq!(session.summary().map(|s| s.summary.as_str()), Some("s1"));

        session.set_document(document("second"));
        assert!(session.summary().is_none());
    }

    #[test]
    fn regenerated_summary_overwrites_previous() {
        let mut session = Session::new();
        let doc = document("text");
        let id = doc.id.clone();
        session.set_document(doc);
        session.set_summary(&id, summary("old"));
        session.set_summary(&id, summary("new"));
        assert_eq!(session.summary().map(|s| s.summary.as_str()), Some("new"));
    }

    #[test]
    fn stale_summary_is_rejected() {
        let mut session = Session::new();
        session.set_document(document("current"));
        assert!(!session.set_summary("not-the-current-id", summary("stale")));
        assert!(session.summary().is_none());
    }
}
