//! Service Configuration Module
//!
//! Centralizes environment-driven settings for the scoring service: the
//! similarity provider, its timeout, the transcription retry budget, and
//! the logging level. Scoring parameters (weights, bands, thresholds) live
//! in `interview_core::config` and are loaded separately.

use std::env;
use std::time::Duration;
use tracing::Level;

/// Which semantic-similarity backend to use. `Lexical` disables the
/// external call entirely: semantic scores fall back to the lexical score
/// and are flagged degraded, which is useful for offline runs and tests.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityProvider {
    Embedding,
    Lexical,
}

/// Holds all configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub embedding_api_key: Option<String>,
    pub embedding_model: String,
    pub embedding_endpoint: String,
    pub similarity_timeout: Duration,
    pub transcription_attempts: u32,
    pub log_level: Level,
    pub provider: SimilarityProvider,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    // *   `SIMILARITY_PROVIDER`: "embedding" or "lexical". Defaults to "embedding".
    // *   `EMBEDDING_API_KEY`: Secret key for the embedding API. Required if provider is "embedding".
    // *   `EMBEDDING_MODEL`: (Optional) Embedding model id. Defaults to "text-embedding-3-small".
    // *   `EMBEDDING_ENDPOINT`: (Optional) Embeddings endpoint URL.
    // *   `SIMILARITY_TIMEOUT_MS`: (Optional) Bound on the similarity call. Defaults to 4000.
    // *   `TRANSCRIPTION_ATTEMPTS`: (Optional) Retry budget for speech-to-text. Defaults to 3.
    // *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file. This is useful for local development and is ignored if not present.
        dotenvy::dotenv().ok();

        let provider_str =
            env::var("SIMILARITY_PROVIDER").unwrap_or_else(|_| "embedding".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "lexical" => SimilarityProvider::Lexical,
            // Default to the embedding backend for "embedding" or any other value.
            _ => SimilarityProvider::Embedding,
        };

        let embedding_api_key = env::var("EMBEDDING_API_KEY").ok();
        let embedding_model =
            env::var("EMBEDDING_MODEL").unwrap_or_else(|_| "text-embedding-3-small".to_string());
        let embedding_endpoint = env::var("EMBEDDING_ENDPOINT")
            .unwrap_or_else(|_| "https://api.openai.com/v1/embeddings".to_string());

        let timeout_ms = env::var("SIMILARITY_TIMEOUT_MS")
            .unwrap_or_else(|_| "4000".to_string())
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue("SIMILARITY_TIMEOUT_MS", e.to_string()))?;

        let transcription_attempts = env::var("TRANSCRIPTION_ATTEMPTS")
            .unwrap_or_else(|_| "3".to_string())
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidValue("TRANSCRIPTION_ATTEMPTS", e.to_string()))?;
        if transcription_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "TRANSCRIPTION_ATTEMPTS",
                "must be at least 1".to_string(),
            ));
        }

        // Configure logging level from RUST_LOG, with a sensible default.
        let log_level_str = env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        let config = Self {
            embedding_api_key,
            embedding_model,
            embedding_endpoint,
            similarity_timeout: Duration::from_millis(timeout_ms),
            transcription_attempts,
            log_level,
            provider,
        };

        // Validate that the required API key is present for the selected provider.
        if config.provider == SimilarityProvider::Embedding && config.embedding_api_key.is_none() {
            return Err(ConfigError::MissingVar(
                "EMBEDDING_API_KEY must be set for the embedding provider".to_string(),
            ));
        }

        Ok(config)
    }
}
