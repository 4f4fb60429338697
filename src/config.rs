use std::env;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_HF_INFERENCE_URL: &str = "https://router.huggingface.co/hf-inference";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_HF_SUMMARIZATION_MODEL: &str = "facebook/bart-large-cnn";
const DEFAULT_HF_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
const DEFAULT_OLLAMA_SUMMARIZATION_MODEL: &str = "llama3.2";
const DEFAULT_OLLAMA_EMBEDDING_MODEL: &str = "all-minilm";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Backends able to serve the summarization and embedding models.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelProvider {
    /// Hugging Face Inference API (hosted pipelines).
    HuggingFace,
    /// Local Ollama runtime.
    Ollama,
}

impl FromStr for ModelProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "huggingface" | "hf" => Ok(Self::HuggingFace),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Runtime configuration for StudyMate.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional Hugging Face access token. Authentication is skipped when absent.
    pub hf_token: Option<String>,
    /// Base URL of the Hugging Face inference router.
    pub hf_inference_url: String,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Provider used for abstractive summarization.
    pub summarization_provider: ModelProvider,
    /// Summarization model identifier passed to the provider.
    pub summarization_model: String,
    /// Lower bound on the generated summary length, in model tokens.
    pub summary_min_length: usize,
    /// Upper bound on the generated summary length, in model tokens.
    pub summary_max_length: usize,
    /// Maximum number of words fed to the model per chunk.
    pub summary_chunk_words: usize,
    /// Documents with fewer words than this are never summarized.
    pub summary_min_document_words: usize,
    /// Provider used for sentence embeddings.
    pub embedding_provider: ModelProvider,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Number of nearest sentences considered when answering.
    pub answer_top_k: usize,
    /// Similarity score a sentence must strictly exceed to be part of an answer.
    pub answer_score_threshold: f32,
    /// Number of characters shown when previewing an uploaded document.
    pub preview_chars: usize,
    /// Largest request body accepted by the HTTP upload route, in bytes.
    pub max_upload_bytes: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let summarization_provider = parse_optional("SUMMARIZATION_PROVIDER", parse_provider)?
            .unwrap_or(ModelProvider::HuggingFace);
        let embedding_provider = parse_optional("EMBEDDING_PROVIDER", parse_provider)?
            .unwrap_or(ModelProvider::HuggingFace);

        let config = Self {
            hf_token: load_env_optional("HF_TOKEN"),
            hf_inference_url: load_env_optional("HF_INFERENCE_URL")
                .unwrap_or_else(|| DEFAULT_HF_INFERENCE_URL.to_string()),
            ollama_url: load_env_optional("OLLAMA_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            summarization_provider,
            summarization_model: load_env_optional("SUMMARIZATION_MODEL").unwrap_or_else(|| {
                match summarization_provider {
                    ModelProvider::HuggingFace => DEFAULT_HF_SUMMARIZATION_MODEL,
                    ModelProvider::Ollama => DEFAULT_OLLAMA_SUMMARIZATION_MODEL,
                }
                .to_string()
            }),
            summary_min_length: parse_optional("SUMMARY_MIN_LENGTH", parse_number)?
                .unwrap_or(50),
            summary_max_length: parse_optional("SUMMARY_MAX_LENGTH", parse_number)?
                .unwrap_or(150),
            summary_chunk_words: parse_optional("SUMMARY_CHUNK_WORDS", parse_number)?
                .unwrap_or(400),
            summary_min_document_words: parse_optional("SUMMARY_MIN_DOCUMENT_WORDS", parse_number)?
                .unwrap_or(50),
            embedding_provider,
            embedding_model: load_env_optional("EMBEDDING_MODEL").unwrap_or_else(|| {
                match embedding_provider {
                    ModelProvider::HuggingFace => DEFAULT_HF_EMBEDDING_MODEL,
                    ModelProvider::Ollama => DEFAULT_OLLAMA_EMBEDDING_MODEL,
                }
                .to_string()
            }),
            answer_top_k: parse_optional("ANSWER_TOP_K", parse_number)?
                .unwrap_or(5),
            answer_score_threshold: parse_optional("ANSWER_SCORE_THRESHOLD", parse_score)?
                .unwrap_or(0.3),
            preview_chars: parse_optional("PREVIEW_CHARS", parse_number)?
                .unwrap_or(1200),
            max_upload_bytes: parse_optional("MAX_UPLOAD_BYTES", parse_number)?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            server_port: parse_optional("SERVER_PORT", parse_number)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Load `.env` (when present) and then read the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let config = Self::from_env()?;
        tracing::debug!(
            summarization_provider = ?config.summarization_provider,
            summarization_model = %config.summarization_model,
            embedding_provider = ?config.embedding_provider,
            embedding_model = %config.embedding_model,
            has_hf_token = config.hf_token.is_some(),
            max_upload_bytes = config.max_upload_bytes,
            server_port = ?config.server_port,
            "Loaded configuration"
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.summary_chunk_words == 0 {
            return Err(ConfigError::InvalidValue("SUMMARY_CHUNK_WORDS".into()));
        }
        if self.summary_min_length > self.summary_max_length {
            return Err(ConfigError::InvalidValue(
                "SUMMARY_MIN_LENGTH exceeds SUMMARY_MAX_LENGTH".into(),
            ));
        }
        if self.answer_top_k == 0 {
            return Err(ConfigError::InvalidValue("ANSWER_TOP_K".into()));
        }
        if self.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue("MAX_UPLOAD_BYTES".into()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hf_token: None,
            hf_inference_url: DEFAULT_HF_INFERENCE_URL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            summarization_provider: ModelProvider::HuggingFace,
            summarization_model: DEFAULT_HF_SUMMARIZATION_MODEL.to_string(),
            summary_min_length: 50,
            summary_max_length: 150,
            summary_chunk_words: 400,
            summary_min_document_words: 50,
            embedding_provider: ModelProvider::HuggingFace,
            embedding_model: DEFAULT_HF_EMBEDDING_MODEL.to_string(),
            answer_top_k: 5,
            answer_score_threshold: 0.3,
            preview_chars: 1200,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            server_port: None,
        }
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T>(
    key: &str,
    parse: fn(&str, &str) -> Result<T, ConfigError>,
) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| parse(key, value.trim()))
        .transpose()
}

fn parse_provider(key: &str, value: &str) -> Result<ModelProvider, ConfigError> {
    value
        .parse()
        .map_err(|()| ConfigError::InvalidValue(key.to_string()))
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

fn parse_score(key: &str, value: &str) -> Result<f32, ConfigError> {
    let score: f32 = parse_number(key, value)?;
    if score.is_finite() {
        Ok(score)
    } else {
        Err(ConfigError::InvalidValue(key.to_string()))
    }
}
