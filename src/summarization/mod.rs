//! Abstractive summarization providers.
//!
//! The default backend is the Hugging Face Inference API running a sequence-to-sequence
//! summarization pipeline (`facebook/bart-large-cnn`), which accepts explicit length bounds and a
//! greedy decoding flag. The Ollama adapter covers local runs; it cannot enforce a minimum length,
//! so the bounds are carried in the prompt and the token cap in `num_predict`.

use crate::config::{Config, ModelProvider};
use crate::inference::{EndpointFailure, InferenceEndpoint, InferenceError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced while attempting abstractive summarization.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider was unreachable or the model endpoint does not exist.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

impl From<EndpointFailure> for SummarizationClientError {
    fn from(failure: EndpointFailure) -> Self {
        match failure {
            EndpointFailure::Unreachable(message) => Self::ProviderUnavailable(message),
            EndpointFailure::Status { status, body } if status == StatusCode::NOT_FOUND => {
                Self::ProviderUnavailable(format!("model endpoint returned 404: {body}"))
            }
            EndpointFailure::Status { status, body } => {
                Self::GenerationFailed(format!("provider returned {status}: {body}"))
            }
        }
    }
}

/// Request payload passed to the summarization provider.
#[derive(Debug, Clone)]
pub struct SummarizationRequest {
    /// Text to condense.
    pub text: String,
    /// Minimum summary length in model tokens.
    pub min_length: usize,
    /// Maximum summary length in model tokens.
    pub max_length: usize,
    /// Whether the decoder may sample. `false` selects deterministic decoding.
    pub do_sample: bool,
}

/// Interface implemented by abstractive summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Generate a summary for a single piece of text.
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError>;
}

/// Build the summarization client selected by configuration.
pub fn get_summarization_client(
    config: &Config,
) -> Result<Box<dyn SummarizationClient>, InferenceError> {
    let client: Box<dyn SummarizationClient> = match config.summarization_provider {
        ModelProvider::HuggingFace => Box::new(HuggingFaceSummarizationClient::new(
            &config.hf_inference_url,
            config.hf_token.clone(),
            config.summarization_model.clone(),
        )?),
        ModelProvider::Ollama => Box::new(OllamaSummarizationClient::new(
            &config.ollama_url,
            config.summarization_model.clone(),
        )?),
    };
    tracing::info!(
        provider = ?config.summarization_provider,
        model = %config.summarization_model,
        "Summarization client initialized"
    );
    Ok(client)
}

/// Hugging Face Inference API summarization pipeline.
pub struct HuggingFaceSummarizationClient {
    endpoint: InferenceEndpoint,
    model: String,
}

impl HuggingFaceSummarizationClient {
    /// Create a client for `model` hosted behind `base_url`.
    pub fn new(
        base_url: &str,
        token: Option<String>,
        model: String,
    ) -> Result<Self, InferenceError> {
        Ok(Self {
            endpoint: InferenceEndpoint::new(base_url, token, "studymate/summary")?,
            model,
        })
    }

    fn path(&self) -> String {
        format!("models/{}", self.model)
    }
}

#[derive(Debug, Deserialize)]
struct HuggingFaceSummary {
    summary_text: String,
}

#[async_trait]
impl SummarizationClient for HuggingFaceSummarizationClient {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "inputs": request.text,
            "parameters": {
                "min_length": request.min_length,
                "max_length": request.max_length,
                "do_sample": request.do_sample,
            },
            "options": {
                "wait_for_model": true,
            }
        });

        let response = self
            .endpoint
            .send(self.endpoint.post(&self.path()).json(&payload))
            .await?;

        let body: Vec<HuggingFaceSummary> = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode summarization response: {error}"
            ))
        })?;

        body.into_iter()
            .next()
            .map(|summary| summary.summary_text.trim().to_string())
            .ok_or_else(|| {
                SummarizationClientError::InvalidResponse("provider returned no summaries".into())
            })
    }
}

/// Ollama `/api/generate` adapter.
pub struct OllamaSummarizationClient {
    endpoint: InferenceEndpoint,
    model: String,
}

impl OllamaSummarizationClient {
    /// Create a client for `model` served by the Ollama runtime at `base_url`.
    pub fn new(base_url: &str, model: String) -> Result<Self, InferenceError> {
        Ok(Self {
            endpoint: InferenceEndpoint::new(base_url, None, "studymate/summary")?,
            model,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

fn build_prompt(request: &SummarizationRequest) -> String {
    format!(
        "Summarize the following text in a single paragraph of between {} and {} words. \
         Be factual and do not add information that is not in the text.\n\n{}",
        request.min_length, request.max_length, request.text
    )
}

#[async_trait]
impl SummarizationClient for OllamaSummarizationClient {
    async fn generate_summary(
        &self,
        request: SummarizationRequest,
    ) -> Result<String, SummarizationClientError> {
        let temperature = if request.do_sample { 0.8 } else { 0.0 };
        let payload = json!({
            "model": self.model,
            "prompt": build_prompt(&request),
            "stream": false,
            "options": {
                "temperature": temperature,
                "num_predict": request.max_length,
            }
        });

        let response = self
            .endpoint
            .send(self.endpoint.post("api/generate").json(&payload))
            .await?;

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(SummarizationClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn request(text: &str) -> SummarizationRequest {
        SummarizationRequest {
            text: text.into(),
            min_length: 50,
            max_length: 150,
            do_sample: false,
        }
    }

    #[tokio::test]
    async fn huggingface_client_sends_length_bounds_and_token() {
        let server = MockServer::start_async().await;
        let client = HuggingFaceSummarizationClient::new(
            &server.base_url(),
            Some("hf_secret".into()),
            "facebook/bart-large-cnn".into(),
        )
        .expect("client");

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/models/facebook/bart-large-cnn")
                    .header("authorization", "Bearer hf_secret")
                    .json_body_partial(
                        r#"{"parameters":{"min_length":50,"max_length":150,"do_sample":false}}"#,
                    );
                then.status(200)
                    .json_body(json!([{ "summary_text": " A short summary. " }]));
            })
            .await;

        let summary = client
            .generate_summary(request("Long chunk of text"))
            .await
            .expect("summary");

        mock.assert();
        assert_eq!(summary, "A short summary.");
    }

    #[tokio::test]
    async fn huggingface_client_reports_provider_error_message() {
        let server = MockServer::start_async().await;
        let client = HuggingFaceSummarizationClient::new(
            &server.base_url(),
            None,
            "facebook/bart-large-cnn".into(),
        )
        .expect("client");

        server
            .mock_async(|when, then| {
                when.method(POST).path("/models/facebook/bart-large-cnn");
                then.status(400)
                    .json_body(json!({ "error": "index out of range in self" }));
            })
            .await;

        let error = client
            .generate_summary(request("oversized"))
            .await
            .expect_err("error response");

        assert!(matches!(
            &error,
            SummarizationClientError::GenerationFailed(message)
                if message.contains("400") && message.contains("index out of range")
        ));
    }

    #[tokio::test]
    async fn huggingface_client_rejects_empty_result_list() {
        let server = MockServer::start_async().await;
        let client =
            HuggingFaceSummarizationClient::new(&server.base_url(), None, "bart".into())
                .expect("client");

        server
            .mock_async(|when, then| {
                when.method(POST).path("/models/bart");
                then.status(200).json_body(json!([]));
            })
            .await;

        let error = client
            .generate_summary(request("text"))
            .await
            .expect_err("empty list");
        assert!(matches!(error, SummarizationClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn ollama_client_handles_successful_response() {
        let server = MockServer::start_async().await;
        let client =
            OllamaSummarizationClient::new(&server.base_url(), "llama3.2".into()).expect("client");

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .json_body_partial(r#"{"model":"llama3.2","stream":false}"#);
                then.status(200).json_body(json!({
                    "response": "Summary text",
                    "done": true
                }));
            })
            .await;

        let summary = client
            .generate_summary(request("Summarize me"))
            .await
            .expect("summary");

        mock.assert();
        assert_eq!(summary, "Summary text");
    }

    #[tokio::test]
    async fn ollama_missing_model_is_reported_as_unavailable() {
        let server = MockServer::start_async().await;
        let client =
            OllamaSummarizationClient::new(&server.base_url(), "missing".into()).expect("client");

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(404).body("model not found");
            })
            .await;

        let error = client
            .generate_summary(request("text"))
            .await
            .expect_err("404");
        assert!(matches!(error, SummarizationClientError::ProviderUnavailable(_)));
    }

    #[test]
    fn prompt_carries_length_bounds() {
        let prompt = build_prompt(&request("Body"));
        assert!(prompt.contains("between 50 and 150 words"));
        assert!(prompt.ends_with("Body"));
    }
}
