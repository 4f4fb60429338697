//! HTTP plumbing shared by the summarization and embedding adapters.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use thiserror::Error;

/// Errors raised while preparing a model endpoint.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid inference URL: {0}")]
    InvalidUrl(String),
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failure returned by a model endpoint, before it is mapped into a client-specific error.
#[derive(Debug)]
pub(crate) enum EndpointFailure {
    /// The request never produced a response.
    Unreachable(String),
    /// The endpoint answered with a non-success status.
    Status { status: StatusCode, body: String },
}

/// Base URL plus optional bearer credential for a model-hosting service.
pub(crate) struct InferenceEndpoint {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl InferenceEndpoint {
    pub(crate) fn new(
        base_url: &str,
        token: Option<String>,
        user_agent: &str,
    ) -> Result<Self, InferenceError> {
        let client = Client::builder().user_agent(user_agent).build()?;
        let base_url = normalize_base_url(base_url).map_err(InferenceError::InvalidUrl)?;
        let token = token.filter(|value| !value.trim().is_empty());
        tracing::debug!(
            url = %base_url,
            authenticated = token.is_some(),
            "Initialized inference endpoint"
        );
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format_endpoint(&self.base_url, path)
    }

    pub(crate) fn post(&self, path: &str) -> RequestBuilder {
        let request = self.client.post(self.url(path));
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and return the response when the status indicates success.
    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, EndpointFailure> {
        let response = request.send().await.map_err(|error| {
            EndpointFailure::Unreachable(format!("failed to reach {}: {error}", self.base_url))
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(EndpointFailure::Status {
            status,
            body: extract_error_message(&body),
        })
    }
}

/// Hosted pipelines usually wrap failures as `{"error": "..."}`; surface only the message.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
