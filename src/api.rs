//! HTTP surface for StudyMate.
//!
//! The router keeps a single-user session holding the current document and its latest summary:
//!
//! - `POST /document` – Upload raw PDF bytes (up to the configured body limit); the extracted
//!   text becomes the current document.
//! - `GET /document` – Metadata and a text preview of the current document.
//! - `POST /summary` – Summarize (or re-summarize) the current document.
//! - `GET /summary` – Return the latest summary.
//! - `POST /answer` – Answer a question (`{ "question": "..." }`) from the current document.
//! - `GET /metrics` – Activity counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.
//!
//! Requests run one after another against the session; model calls are not time-limited, so a
//! summary of a long document on slow hardware can take minutes.

use crate::processing::{ScoredSentence, ServiceError, StudyApi, SummaryOutcome};
use crate::session::{Document, Session};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared state behind every route.
struct AppState<S> {
    service: Arc<S>,
    session: RwLock<Session>,
    preview_chars: usize,
}

/// Build the HTTP router around `service` with a fresh session.
///
/// Request bodies larger than `max_upload_bytes` are rejected with `413 Payload Too Large`.
pub fn create_router<S>(service: Arc<S>, preview_chars: usize, max_upload_bytes: usize) -> Router
where
    S: StudyApi + 'static,
{
    let state = Arc::new(AppState {
        service,
        session: RwLock::new(Session::new()),
        preview_chars,
    });
    Router::new()
        .route(
            "/document",
            get(get_document::<S>).post(upload_document::<S>),
        )
        .route(
            "/summary",
            get(get_summary::<S>).post(generate_summary::<S>),
        )
        .route("/answer", post(answer_question::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

/// Response body describing the current document.
#[derive(Serialize)]
struct DocumentResponse {
    document_id: String,
    page_count: usize,
    word_count: usize,
    uploaded_at: String,
    preview: String,
}

impl DocumentResponse {
    fn new(document: &Document, preview_chars: usize) -> Self {
        Self {
            document_id: document.id.clone(),
            page_count: document.page_count,
            word_count: document.word_count,
            uploaded_at: document.uploaded_at.clone(),
            preview: document.preview(preview_chars),
        }
    }
}

/// Extract an uploaded PDF and make it the current document.
///
/// Extraction is CPU bound and runs on the blocking pool. Uploading replaces the previous
/// document and discards its summary.
async fn upload_document<S>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<Json<DocumentResponse>, AppError>
where
    S: StudyApi + 'static,
{
    if body.is_empty() {
        return Err(AppError::BadRequest("request body must contain a PDF".into()));
    }

    let service = Arc::clone(&state.service);
    let document = tokio::task::spawn_blocking(move || service.load_document(&body))
        .await
        .map_err(|error| AppError::Internal(format!("extraction task failed: {error}")))??;

    let response = DocumentResponse::new(&document, state.preview_chars);
    state.session.write().await.set_document(document);
    tracing::info!(
        document_id = %response.document_id,
        pages = response.page_count,
        words = response.word_count,
        "Upload request completed"
    );
    Ok(Json(response))
}

/// Describe the current document.
async fn get_document<S>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<DocumentResponse>, AppError>
where
    S: StudyApi,
{
    let session = state.session.read().await;
    let document = session.document().ok_or(AppError::NoDocument)?;
    Ok(Json(DocumentResponse::new(document, state.preview_chars)))
}

/// Response body for the summary endpoints.
#[derive(Serialize)]
struct SummaryResponse {
    document_id: String,
    #[serde(flatten)]
    outcome: SummaryOutcome,
}

/// Summarize the current document and store the result in the session.
async fn generate_summary<S>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<SummaryResponse>, AppError>
where
    S: StudyApi,
{
    let document = current_document(&state).await?;
    let outcome = state.service.summarize(&document).await?;

    let stored = state
        .session
        .write()
        .await
        .set_summary(&document.id, outcome.clone());
    if !stored {
        tracing::warn!(
            document_id = %document.id,
            "Document replaced while summarizing; summary not stored"
        );
    }

    Ok(Json(SummaryResponse {
        document_id: document.id,
        outcome,
    }))
}

/// Return the latest summary of the current document.
async fn get_summary<S>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<SummaryResponse>, AppError>
where
    S: StudyApi,
{
    let session = state.session.read().await;
    let document = session.document().ok_or(AppError::NoDocument)?;
    let outcome = session.summary().ok_or(AppError::NoSummary)?;
    Ok(Json(SummaryResponse {
        document_id: document.id.clone(),
        outcome: outcome.clone(),
    }))
}

/// Request body for `POST /answer`.
#[derive(Deserialize)]
struct AnswerRequest {
    question: String,
}

/// Response body for `POST /answer`.
#[derive(Serialize)]
struct AnswerResponse {
    document_id: String,
    question: String,
    answer: String,
    sentences: Vec<ScoredSentence>,
}

/// Answer a question from the current document.
async fn answer_question<S>(
    State(state): State<Arc<AppState<S>>>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError>
where
    S: StudyApi,
{
    let question = request.question.trim();
    if question.is_empty() {
        return Err(AppError::BadRequest("question must not be empty".into()));
    }

    let document = current_document(&state).await?;
    let answer = state.service.answer(&document, question).await?;
    Ok(Json(AnswerResponse {
        document_id: document.id,
        question: question.to_string(),
        answer: answer.text,
        sentences: answer.sentences,
    }))
}

/// Return a snapshot of the activity counters.
async fn get_metrics<S>(State(state): State<Arc<AppState<S>>>) -> Json<serde_json::Value>
where
    S: StudyApi,
{
    Json(json!(state.service.metrics_snapshot()))
}

/// Clone the current document out of the session so the lock is not held during inference.
async fn current_document<S>(state: &AppState<S>) -> Result<Document, AppError> {
    state
        .session
        .read()
        .await
        .document()
        .cloned()
        .ok_or(AppError::NoDocument)
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "upload_document",
                method: "POST",
                path: "/document",
                description: "Upload raw PDF bytes (Content-Type: application/pdf). The extracted text becomes the current document; any previous summary is discarded.",
                request_example: None,
            },
            CommandDescriptor {
                name: "get_document",
                method: "GET",
                path: "/document",
                description: "Return page count, word count, and a text preview of the current document.",
                request_example: None,
            },
            CommandDescriptor {
                name: "summarize",
                method: "POST",
                path: "/summary",
                description: "Summarize the current document chunk by chunk. Documents under the word minimum return a fixed message.",
                request_example: None,
            },
            CommandDescriptor {
                name: "get_summary",
                method: "GET",
                path: "/summary",
                description: "Return the latest summary of the current document.",
                request_example: None,
            },
            CommandDescriptor {
                name: "answer",
                method: "POST",
                path: "/answer",
                description: "Answer a question with the document sentences most similar to it.",
                request_example: Some(json!({ "question": "What is the main finding?" })),
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return activity counters (documents, summaries, chunk failures, questions).",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    NoDocument,
    NoSummary,
    BadRequest(String),
    Service(ServiceError),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NoDocument => (
                StatusCode::CONFLICT,
                "Please upload a PDF first.".to_string(),
            ),
            Self::NoSummary => (
                StatusCode::NOT_FOUND,
                "No summary has been generated for the current document.".to_string(),
            ),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Service(error) => {
                let status = match &error {
                    ServiceError::Pdf(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    ServiceError::Answer(_) => StatusCode::BAD_GATEWAY,
                    ServiceError::Chunking(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                tracing::error!(error = %error, "Request failed");
                (status, error.to_string())
            }
            Self::Internal(message) => {
                tracing::error!(error = %message, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, message).into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(inner: ServiceError) -> Self {
        Self::Service(inner)
    }
}
