//! Question answering by nearest-sentence retrieval.
//!
//! The document is split into candidate sentences on the literal `". "` delimiter. This is a
//! naive heuristic rather than real sentence-boundary detection: abbreviations such as "e.g. "
//! split a sentence, and a sentence ending in `.` followed by a newline is not split at all.
//! Candidates are trimmed and blank ones dropped, so an empty document never reaches the model.
//!
//! Ranking is a linear cosine-similarity scan over all candidates.

use crate::embedding::EmbeddingClient;

use super::types::{Answer, AnswerError, ScoredSentence, SearchHit};

/// Parameters controlling answer retrieval.
#[derive(Debug, Clone, Copy)]
pub struct AnswerOptions {
    /// Number of nearest sentences considered.
    pub top_k: usize,
    /// Score a sentence must strictly exceed to be kept.
    pub score_threshold: f32,
}

impl Default for AnswerOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            score_threshold: 0.3,
        }
    }
}

/// Split `text` into candidate sentences on `". "`.
pub fn split_sentences(text: &str) -> Vec<&str> {
    text.split(". ")
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

/// Cosine similarity of two vectors; `0.0` for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

/// Rank `candidates` by similarity to `query` and return the best `top_k`, highest first.
///
/// Equal scores keep candidate order.
pub fn semantic_search(query: &[f32], candidates: &[Vec<f32>], top_k: usize) -> Vec<SearchHit> {
    let mut hits: Vec<SearchHit> = candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| SearchHit {
            index,
            score: cosine_similarity(query, candidate),
        })
        .collect();
    hits.sort_by(|left, right| right.score.total_cmp(&left.score));
    hits.truncate(top_k);
    hits
}

/// Answer `question` from the sentences of `text`.
pub async fn answer_question(
    client: &dyn EmbeddingClient,
    question: &str,
    text: &str,
    options: &AnswerOptions,
) -> Result<Answer, AnswerError> {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        tracing::debug!("Document has no candidate sentences");
        return Ok(Answer::from_sentences(Vec::new()));
    }

    let mut inputs = Vec::with_capacity(sentences.len() + 1);
    inputs.push(question.to_string());
    inputs.extend(sentences.iter().map(|sentence| sentence.to_string()));

    let vectors = client.generate_embeddings(inputs).await?;
    let (query, candidates) = vectors.split_first().ok_or(AnswerError::EmptyEmbedding)?;

    let hits = semantic_search(query, candidates, options.top_k);
    let retained: Vec<ScoredSentence> = hits
        .into_iter()
        .filter(|hit| hit.score > options.score_threshold)
        .filter_map(|hit| {
            sentences.get(hit.index).map(|sentence| ScoredSentence {
                text: sentence.to_string(),
                score: hit.score,
            })
        })
        .collect();

    tracing::info!(
        candidates = sentences.len(),
        retained = retained.len(),
        top_score = retained.first().map(|sentence| sentence.score),
        "Question answered"
    );
    Ok(Answer::from_sentences(retained))
}
