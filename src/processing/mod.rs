//! Document processing pipeline: extraction, chunked summarization, and sentence retrieval.

pub mod chunking;
pub mod retrieval;
mod service;
pub mod summarize;
pub mod types;

pub use retrieval::AnswerOptions;
pub use service::{ServiceError, StudyApi, StudyService};
pub use summarize::SummaryOptions;
pub use types::{
    Answer, AnswerError, ChunkSummary, ChunkingError, NO_ANSWER_SENTINEL, SHORT_DOCUMENT_SENTINEL,
    ScoredSentence, SearchHit, SummaryOutcome,
};
