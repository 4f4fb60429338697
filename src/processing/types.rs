//! Core data types and error definitions for the processing pipeline.

use crate::embedding::EmbeddingClientError;
use crate::summarization::SummarizationClientError;
use serde::Serialize;
use thiserror::Error;

/// Returned instead of a summary when the document is below the word minimum.
pub const SHORT_DOCUMENT_SENTINEL: &str = "Document too short to summarize.";

/// Returned instead of an answer when no sentence clears the score threshold.
pub const NO_ANSWER_SENTINEL: &str = "No relevant answer found.";

/// Errors produced while turning raw text into word chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Summarization configured an impossible word budget.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Errors emitted while answering a question.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// Embedding provider failed to return vectors for the question or sentences.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Embedding provider returned no vector for the question.
    #[error("Embedding provider returned no vector for the question")]
    EmptyEmbedding,
}

/// Outcome of summarizing a single chunk.
#[derive(Debug)]
pub enum ChunkSummary {
    /// The model produced a summary for the chunk.
    Summarized(String),
    /// The model call failed; the chunk is represented by a placeholder.
    Failed(SummarizationClientError),
}

impl ChunkSummary {
    /// Text contributed to the stitched summary.
    pub fn render(&self) -> String {
        match self {
            Self::Summarized(text) => text.clone(),
            Self::Failed(error) => format!("[Error summarizing chunk: {error}]"),
        }
    }

    /// Whether the chunk was summarized successfully.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Summarized(_))
    }
}

/// Result of summarizing a whole document.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryOutcome {
    /// Stitched summary, or the short-document sentinel.
    pub summary: String,
    /// Number of chunks sent to the model.
    pub chunk_count: usize,
    /// Number of chunks replaced by an error placeholder.
    pub failed_chunks: usize,
    /// Whether the document was skipped for being too short.
    pub too_short: bool,
}

/// Ranked candidate returned by the similarity scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchHit {
    /// Index of the candidate in the input sequence.
    pub index: usize,
    /// Cosine similarity to the query.
    pub score: f32,
}

/// Sentence retained for an answer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredSentence {
    /// Sentence text as split from the document.
    pub text: String,
    /// Similarity to the question.
    pub score: f32,
}

/// Answer assembled from the best-matching sentences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    /// Retained sentences joined by a space, or the no-answer sentinel.
    pub text: String,
    /// Retained sentences in descending score order.
    pub sentences: Vec<ScoredSentence>,
}

impl Answer {
    pub(crate) fn from_sentences(sentences: Vec<ScoredSentence>) -> Self {
        let text = if sentences.is_empty() {
            NO_ANSWER_SENTINEL.to_string()
        } else {
            sentences
                .iter()
                .map(|sentence| sentence.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        };
        Self { text, sentences }
    }

    /// Whether any sentence cleared the threshold.
    pub fn is_found(&self) -> bool {
        !self.sentences.is_empty()
    }
}
