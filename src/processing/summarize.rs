//! Chunked abstractive summarization.
//!
//! Documents under the word minimum short-circuit to [`SHORT_DOCUMENT_SENTINEL`] without touching
//! the model. Longer documents are split with [`chunk_words`] and each chunk is summarized on its
//! own, strictly in order. A failing chunk turns into an inline placeholder so the rest of the
//! document is still summarized.

use crate::summarization::{SummarizationClient, SummarizationRequest};

use super::chunking::{DEFAULT_CHUNK_WORDS, chunk_words, count_words};
use super::types::{ChunkSummary, ChunkingError, SHORT_DOCUMENT_SENTINEL, SummaryOutcome};

/// Parameters controlling document summarization.
#[derive(Debug, Clone, Copy)]
pub struct SummaryOptions {
    /// Documents with fewer words are not summarized.
    pub min_document_words: usize,
    /// Words per chunk sent to the model.
    pub chunk_words: usize,
    /// Minimum summary length per chunk, in model tokens.
    pub min_length: usize,
    /// Maximum summary length per chunk, in model tokens.
    pub max_length: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            min_document_words: 50,
            chunk_words: DEFAULT_CHUNK_WORDS,
            min_length: 50,
            max_length: 150,
        }
    }
}

/// Summarize each chunk of `text` and return the per-chunk outcomes in document order.
pub async fn summarize_chunks(
    client: &dyn SummarizationClient,
    text: &str,
    options: &SummaryOptions,
) -> Result<Vec<ChunkSummary>, ChunkingError> {
    let mut outcomes = Vec::new();
    for (index, chunk) in chunk_words(text, options.chunk_words)?.enumerate() {
        let words = count_words(&chunk);
        let request = SummarizationRequest {
            text: chunk,
            min_length: options.min_length,
            max_length: options.max_length,
            do_sample: false,
        };
        let outcome = match client.generate_summary(request).await {
            Ok(summary) => {
                tracing::debug!(chunk = index, words, "Chunk summarized");
                ChunkSummary::Summarized(summary)
            }
            Err(error) => {
                tracing::warn!(chunk = index, words, error = %error, "Chunk summarization failed");
                ChunkSummary::Failed(error)
            }
        };
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// Summarize a whole document, stitching per-chunk results with single spaces.
pub async fn summarize_text(
    client: &dyn SummarizationClient,
    text: &str,
    options: &SummaryOptions,
) -> Result<SummaryOutcome, ChunkingError> {
    let words = count_words(text);
    if words < options.min_document_words {
        tracing::info!(
            words,
            min_words = options.min_document_words,
            "Document too short to summarize"
        );
        return Ok(SummaryOutcome {
            summary: SHORT_DOCUMENT_SENTINEL.to_string(),
            chunk_count: 0,
            failed_chunks: 0,
            too_short: true,
        });
    }

    let outcomes = summarize_chunks(client, text, options).await?;
    let failed_chunks = outcomes.iter().filter(|outcome| !outcome.is_success()).count();
    let summary = outcomes
        .iter()
        .map(ChunkSummary::render)
        .collect::<Vec<_>>()
        .join(" ");

    tracing::info!(
        words,
        chunks = outcomes.len(),
        failed_chunks,
        "Document summarized"
    );
    Ok(SummaryOutcome {
        summary,
        chunk_count: outcomes.len(),
        failed_chunks,
        too_short: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarization::SummarizationClientError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every chunk it sees; fails chunks whose text contains `fail_marker`.
    struct RecordingClient {
        calls: Mutex<Vec<SummarizationRequest>>,
        fail_marker: Option<&'static str>,
    }

    impl RecordingClient {
        fn new(fail_marker: Option<&'static str>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_marker,
            }
        }

        fn calls(&self) -> Vec<SummarizationRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SummarizationClient for RecordingClient {
        async fn generate_summary(
            &self,
            request: SummarizationRequest,
        ) -> Result<String, SummarizationClientError> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request.clone());
            let index = calls.len();
            if let Some(marker) = self.fail_marker
                && request.text.contains(marker)
            {
                return Err(SummarizationClientError::GenerationFailed(
                    "input too long for model".into(),
                ));
            }
            Ok(format!("summary-{index}"))
        }
    }

    fn words(prefix: &str, count: usize) -> String {
        (0..count)
            .map(|index| format!("{prefix}{index}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[tokio::test]
    async fn short_document_returns_sentinel_without_model_call() {
        let client = RecordingClient::new(None);
        let outcome = summarize_text(&client, &words("w", 49), &SummaryOptions::default())
            .await
            .unwrap();

        assert_eq!(outcome.summary, SHORT_DOCUMENT_SENTINEL);
        assert!(outcome.too_short);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn thousand_word_document_invokes_model_three_times() {
        let client = RecordingClient::new(None);
        let outcome = summarize_text(&client, &words("w", 1000), &SummaryOptions::default())
            .await
            .unwrap();

        let calls = client.calls();
        assert_eq!(calls.len(), 3);
        let sizes: Vec<usize> = calls.iter().map(|call| count_words(&call.text)).collect();
        assert_eq!(sizes, vec![400, 400, 200]);
        assert!(calls.iter().all(|call| {
            call.min_length == 50 && call.max_length == 150 && !call.do_sample
        }));
        assert_eq!(outcome.summary, "summary-1 summary-2 summary-3");
        assert_eq!(outcome.chunk_count, 3);
        assert_eq!(outcome.failed_chunks, 0);
    }

    #[tokio::test]
    async fn failing_chunk_becomes_placeholder_and_others_survive() {
        let text = format!("{} {} {}", words("a", 400), words("bad", 400), words("c", 200));
        let client = RecordingClient::new(Some("bad0"));
        let outcome = summarize_text(&client, &text, &SummaryOptions::default())
            .await
            .unwrap();

        assert_eq!(client.calls().len(), 3);
        assert_eq!(outcome.failed_chunks, 1);
        assert_eq!(
            outcome.summary,
            "summary-1 [Error summarizing chunk: Failed to generate summary: input too long for model] summary-3"
        );
    }

    #[tokio::test]
    async fn chunk_outcomes_follow_document_order() {
        let client = RecordingClient::new(None);
        let options = SummaryOptions {
            chunk_words: 2,
            min_document_words: 0,
            ..SummaryOptions::default()
        };
        let outcomes = summarize_chunks(&client, "one two three four five", &options)
            .await
            .unwrap();

        let texts: Vec<String> = client.calls().into_iter().map(|call| call.text).collect();
        assert_eq!(texts, vec!["one two", "three four", "five"]);
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(ChunkSummary::is_success));
    }

    #[tokio::test]
    async fn zero_chunk_bound_is_an_error() {
        let client = RecordingClient::new(None);
        let options = SummaryOptions {
            chunk_words: 0,
            ..SummaryOptions::default()
        };
        let result = summarize_text(&client, &words("w", 60), &options).await;
        assert!(matches!(result, Err(ChunkingError::InvalidChunkSize)));
    }
}
