//! Ollama embedding provider

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::EmbeddingError;
use crate::http::{check_response, create_client};

use super::traits::EmbeddingProviderTrait;

/// Ollama embedding provider
pub struct OllamaEmbedding {
    client: Client,
    host: String,
    model_name: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

impl OllamaEmbedding {
    /// Create a new Ollama embedding provider
    pub fn new(model_name: String, host: Option<String>) -> Result<Self, EmbeddingError> {
        let host = host
            .or_else(|| env::var("MEMDEX_OLLAMA_HOST").ok())
            .or_else(|| env::var("OLLAMA_HOST").ok())
            .unwrap_or_else(|| "http://localhost:11434".to_string());

        let client = create_client().map_err(|e| EmbeddingError::Unavailable(e.to_string()))?;

        let dimensions = known_dimensions(&model_name);

        info!(
            "Ollama embedding provider: {} @ {} ({} dims)",
            model_name,
            host,
            if dimensions == 0 { "auto".to_string() } else { dimensions.to_string() }
        );

        Ok(Self {
            client,
            host,
            model_name,
            dimensions,
        })
    }
}

/// Default dimensions for common Ollama embedding models (0 = detect)
fn known_dimensions(model_name: &str) -> usize {
    match model_name.split(':').next().unwrap_or(model_name) {
        "all-minilm" => 384,
        "nomic-embed-text" => 768,
        "mxbai-embed-large" => 1024,
        "bge-m3" => 1024,
        "snowflake-arctic-embed" => 1024,
        _ => 0,
    }
}

#[async_trait]
impl EmbeddingProviderTrait for OllamaEmbedding {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest {
            model: &self.model_name,
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.host))
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::Unavailable(format!("Ollama @ {}: {}", self.host, e)))?;

        let response = check_response(response, "Ollama").await?;

        let embed_response: EmbedResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::Request(format!("invalid Ollama response: {}", e)))?;

        Ok(embed_response.embeddings)
    }
}
