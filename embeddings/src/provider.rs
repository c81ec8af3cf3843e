//! Embedding providers.
//!
//! New text is embedded by an external model server. [`OllamaProvider`]
//! talks to a local Ollama instance over its HTTP API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

pub const ENV_OLLAMA_HOST: &str = "OLLAMA_HOST";
pub const ENV_OLLAMA_MODEL: &str = "OLLAMA_MODEL";

/// Where Ollama listens by default.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default embedding model.
pub const DEFAULT_OLLAMA_MODEL: &str = "nomic-embed-text";

/// Output dimension of `nomic-embed-text`.
pub const DEFAULT_DIMENSION: usize = 768;

/// Trait for embedding providers.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the name of this provider.
    fn name(&self) -> &str;

    /// Get the model used for embedding.
    fn model(&self) -> &str;

    /// Generate an embedding for the given text.
    async fn embed(&self, text: &str) -> Result<Embedding>;
}

/// Ollama embedding provider.
pub struct OllamaProvider {
    /// API base URL, without a trailing slash.
    base_url: String,

    /// Model name.
    model: String,

    /// HTTP client.
    client: reqwest::Client,
}

impl OllamaProvider {
    /// Create a provider for the default local server and model.
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: DEFAULT_OLLAMA_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Set the base URL. A bare `host:port` is treated as plain HTTP.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = normalize_base_url(&url.into());
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Read `OLLAMA_HOST` and `OLLAMA_MODEL` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a provider from an arbitrary variable lookup. Unset or empty
    /// variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let mut provider = Self::new();
        if let Some(url) = get(ENV_OLLAMA_HOST) {
            provider = provider.with_base_url(url);
        }
        if let Some(model) = get(ENV_OLLAMA_MODEL) {
            provider = provider.with_model(model.trim());
        }
        provider
    }

    /// The API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Embedding> {
        debug!("Generating embedding with model: {}", self.model);

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&OllamaRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::ApiRequest(format!(
                "{status}: {}",
                error_text.trim()
            )));
        }

        let result: OllamaResponse = response.json().await?;
        let embedding = result.embedding;

        if embedding.is_empty() {
            return Err(EmbeddingError::InvalidResponse(
                "No embedding in response".to_string(),
            ));
        }
        if embedding.iter().any(|v| !v.is_finite()) {
            return Err(EmbeddingError::InvalidResponse(
                "embedding contains non-finite values".to_string(),
            ));
        }

        info!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }
}

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.contains("://") {
        url.to_string()
    } else {
        format!("http://{url}")
    }
}
