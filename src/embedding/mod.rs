use crate::config::{Config, ModelProvider};
use crate::inference::{EndpointFailure, InferenceEndpoint, InferenceError};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider could not be reached.
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed or did not match the request.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

impl From<EndpointFailure> for EmbeddingClientError {
    fn from(failure: EndpointFailure) -> Self {
        match failure {
            EndpointFailure::Unreachable(message) => Self::ProviderUnavailable(message),
            EndpointFailure::Status { status, body } => {
                Self::GenerationFailed(format!("provider returned {status}: {body}"))
            }
        }
    }
}

/// Interface implemented by sentence-embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce one embedding vector per input text, in input order.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Build the embedding client selected by configuration.
pub fn get_embedding_client(config: &Config) -> Result<Box<dyn EmbeddingClient>, InferenceError> {
    let client: Box<dyn EmbeddingClient> = match config.embedding_provider {
        ModelProvider::HuggingFace => Box::new(HuggingFaceEmbeddingClient::new(
            &config.hf_inference_url,
            config.hf_token.clone(),
            config.embedding_model.clone(),
        )?),
        ModelProvider::Ollama => Box::new(OllamaEmbeddingClient::new(
            &config.ollama_url,
            config.embedding_model.clone(),
        )?),
    };
    tracing::info!(
        provider = ?config.embedding_provider,
        model = %config.embedding_model,
        "Embedding client initialized"
    );
    Ok(client)
}

/// Hugging Face feature-extraction pipeline (sentence-transformers models).
pub struct HuggingFaceEmbeddingClient {
    endpoint: InferenceEndpoint,
    model: String,
}

impl HuggingFaceEmbeddingClient {
    /// Create a client for `model` hosted behind `base_url`.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        model: String,
    ) -> Result<Self, InferenceError> {
        Ok(Self {
            endpoint: InferenceEndpoint::new(base_url, token, "studymate/embed")?,
            model,
        })
    }

    fn path(&self) -> String {
        format!("models/{}/pipeline/feature-extraction", self.model)
    }
}

#[async_trait]
impl EmbeddingClient for HuggingFaceEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let expected = texts.len();
        tracing::debug!(model = %self.model, inputs = expected, "Requesting embeddings");

        let payload = json!({
            "inputs": texts,
            "options": {
                "wait_for_model": true,
            }
        });
        let response = self
            .endpoint
            .send(self.endpoint.post(&self.path()).json(&payload))
            .await?;

        let vectors: Vec<Vec<f32>> = response.json().await.map_err(|error| {
            EmbeddingClientError::InvalidResponse(format!(
                "failed to decode feature-extraction response: {error}"
            ))
        })?;
        ensure_count(expected, vectors)
    }
}

/// Ollama `/api/embed` adapter.
pub struct OllamaEmbeddingClient {
    endpoint: InferenceEndpoint,
    model: String,
}

impl OllamaEmbeddingClient {
    /// Create a client for `model` served by the Ollama runtime at `base_url`.
    pub fn new(base_url: &str, model: String) -> Result<Self, InferenceError> {
        Ok(Self {
            endpoint: InferenceEndpoint::new(base_url, None, "studymate/embed")?,
            model,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let expected = texts.len();
        let payload = json!({
            "model": self.model,
            "input": texts,
        });
        let response = self
            .endpoint
            .send(self.endpoint.post("api/embed").json(&payload))
            .await?;

        let body: OllamaEmbedResponse = response.json().await.map_err(|error| {
            EmbeddingClientError::InvalidResponse(format!(
                "failed to decode Ollama embed response: {error}"
            ))
        })?;
        ensure_count(expected, body.embeddings)
    }
}

fn ensure_count(
    expected: usize,
    vectors: Vec<Vec<f32>>,
) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
    if vectors.len() == expected {
        Ok(vectors)
    } else {
        Err(EmbeddingClientError::InvalidResponse(format!(
            "expected {expected} vectors, provider returned {}",
            vectors.len()
        )))
    }
}
