#![deny(missing_docs)]

//! Core library for StudyMate, a PDF summarizer and question answering service.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Shared HTTP plumbing for model-hosting services.
pub mod inference;
/// Structured logging and tracing setup.
pub mod logging;
/// Activity counters.
pub mod metrics;
/// PDF text extraction.
pub mod pdf;
/// Document processing pipeline: chunking, summarization, and retrieval.
pub mod processing;
/// Single-user session state.
pub mod session;
/// Summarization client abstraction and adapters.
pub mod summarization;
