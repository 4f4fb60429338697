//! Processing service owning the model clients shared by every surface.

use crate::{
    config::Config,
    embedding::{EmbeddingClient, get_embedding_client},
    inference::InferenceError,
    metrics::{MetricsSnapshot, StudyMetrics},
    pdf::{self, PdfError},
    processing::{
        retrieval::{AnswerOptions, answer_question},
        summarize::{SummaryOptions, summarize_text},
        types::{Answer, AnswerError, ChunkingError, SummaryOutcome},
    },
    session::Document,
    summarization::{SummarizationClient, get_summarization_client},
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by [`StudyApi`] operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The uploaded bytes could not be read as a PDF.
    #[error(transparent)]
    Pdf(#[from] PdfError),
    /// Summarization was configured with an unusable chunk size.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// Question answering failed.
    #[error(transparent)]
    Answer(#[from] AnswerError),
}

/// Abstraction over the pipeline used by external surfaces (HTTP, CLI).
#[async_trait]
pub trait StudyApi: Send + Sync {
    /// Extract the text of an uploaded PDF.
    fn load_document(&self, bytes: &[u8]) -> Result<Document, ServiceError>;

    /// Summarize a document chunk by chunk.
    async fn summarize(&self, document: &Document) -> Result<SummaryOutcome, ServiceError>;

    /// Answer a question from the sentences of a document.
    async fn answer(&self, document: &Document, question: &str) -> Result<Answer, ServiceError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

/// Coordinates extraction, summarization, and retrieval.
///
/// The service owns the long-lived model clients, so construct it once near process start and
/// share it through an `Arc`. No other state survives between calls.
pub struct StudyService {
    summarization_client: Box<dyn SummarizationClient>,
    embedding_client: Box<dyn EmbeddingClient>,
    summary_options: SummaryOptions,
    answer_options: AnswerOptions,
    metrics: StudyMetrics,
}

impl StudyService {
    /// Assemble a service from explicit model clients.
    pub fn new(
        summarization_client: Box<dyn SummarizationClient>,
        embedding_client: Box<dyn EmbeddingClient>,
        summary_options: SummaryOptions,
        answer_options: AnswerOptions,
    ) -> Self {
        Self {
            summarization_client,
            embedding_client,
            summary_options,
            answer_options,
            metrics: StudyMetrics::new(),
        }
    }

    /// Build the model clients selected by `config`.
    pub fn from_config(config: &Config) -> Result<Self, InferenceError> {
        tracing::info!("Initializing model clients");
        let summarization_client = get_summarization_client(config)?;
        let embedding_client = get_embedding_client(config)?;
        Ok(Self::new(
            summarization_client,
            embedding_client,
            SummaryOptions {
                min_document_words: config.summary_min_document_words,
                chunk_words: config.summary_chunk_words,
                min_length: config.summary_min_length,
                max_length: config.summary_max_length,
            },
            AnswerOptions {
                top_k: config.answer_top_k,
                score_threshold: config.answer_score_threshold,
            },
        ))
    }
}

#[async_trait]
impl StudyApi for StudyService {
    fn load_document(&self, bytes: &[u8]) -> Result<Document, ServiceError> {
        let extracted = pdf::extract_text(bytes)?;
        let document = Document::new(bytes, extracted);
        self.metrics.record_document();
        tracing::info!(
            document_id = %document.id,
            pages = document.page_count,
            words = document.word_count,
            "Document loaded"
        );
        Ok(document)
    }

    async fn summarize(&self, document: &Document) -> Result<SummaryOutcome, ServiceError> {
        tracing::info!(document_id = %document.id, "Summarizing document");
        let outcome = summarize_text(
            self.summarization_client.as_ref(),
            &document.text,
            &self.summary_options,
        )
        .await?;
        self.metrics
            .record_summary(outcome.chunk_count as u64, outcome.failed_chunks as u64);
        Ok(outcome)
    }

    async fn answer(&self, document: &Document, question: &str) -> Result<Answer, ServiceError> {
        tracing::info!(document_id = %document.id, "Answering question");
        let answer = answer_question(
            self.embedding_client.as_ref(),
            question,
            &document.text,
            &self.answer_options,
        )
        .await?;
        self.metrics.record_question(answer.is_found());
        Ok(answer)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::EmbeddingClientError;
    use crate::pdf::fixture_pdf;
    use crate::processing::types::{NO_ANSWER_SENTINEL, SHORT_DOCUMENT_SENTINEL};
    use crate::summarization::{SummarizationClientError, SummarizationRequest};

    struct EchoSummarizer;

    #[async_trait]
    impl SummarizationClient for EchoSummarizer {
        async fn generate_summary(
            &self,
            request: SummarizationRequest,
        ) -> Result<String, SummarizationClientError> {
            let first = request.text.split_whitespace().next().unwrap_or_default();
            Ok(format!("starts with {first}"))
        }
    }

    struct ZeroEmbedder;

    #[async_trait]
    impl EmbeddingClient for ZeroEmbedder {
        async fn generate_embeddings(
            &self,
            texts: Vec<String>,
        ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
            Ok(texts.iter().map(|_| vec![0.0, 0.0]).collect())
        }
    }

    fn service() -> StudyService {
        StudyService::new(
            Box::new(EchoSummarizer),
            Box::new(ZeroEmbedder),
            SummaryOptions::default(),
            AnswerOptions::default(),
        )
    }

    fn document(text: &str) -> Document {
        Document::new(
            text.as_bytes(),
            pdf::ExtractedText {
                text: text.into(),
                page_count: 1,
            },
        )
    }

    #[test]
    fn load_document_extracts_pdf_text() {
        let service = service();
        let bytes = fixture_pdf(&["Mitochondria are the powerhouse of the cell"]);
        let document = service.load_document(&bytes).expect("document");

        assert!(document.text.contains("powerhouse"));
        assert_eq!(document.page_count, 1);
        assert_eq!(service.metrics_snapshot().documents_loaded, 1);
    }

    #[test]
    fn load_document_propagates_parse_errors() {
        let service = service();
        let error = service.load_document(b"%PDF-garbage").expect_err("invalid");
        assert!(matches!(error, ServiceError::Pdf(_)));
        assert_eq!(service.metrics_snapshot().documents_loaded, 0);
    }

    #[tokio::test]
    async fn summarize_records_chunk_metrics() {
        let service = service();
        let text = (0..450).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let outcome = service.summarize(&document(&text)).await.expect("summary");

        assert_eq!(outcome.summary, "starts with w0 starts with w400");
        let snapshot = service.metrics_snapshot();
        assert_eq!(snapshot.summaries_generated, 1);
        assert_eq!(snapshot.chunks_summarized, 2);
    }

    #[tokio::test]
    async fn summarize_short_document_returns_sentinel() {
        let outcome = service()
            .summarize(&document("too short"))
            .await
            .expect("summary");
        assert_eq!(outcome.summary, SHORT_DOCUMENT_SENTINEL);
    }

    #[tokio::test]
    async fn unanswerable_question_is_counted() {
        let service = service();
        let answer = service
            .answer(&document("Zero vectors never match. Nothing scores"), "Why?")
            .await
            .expect("answer");

        assert_eq!(answer.text, NO_ANSWER_SENTINEL);
        assert_eq!(service.metrics_snapshot().questions_unanswered, 1);
    }
}
