//! OpenAI embedding provider

use std::env;

use async_openai::{
    config::OpenAIConfig,
    types::{CreateEmbeddingRequestArgs, EmbeddingInput},
    Client,
};
use async_trait::async_trait;
use tracing::info;

use crate::error::EmbeddingError;

use super::traits::EmbeddingProviderTrait;

/// OpenAI (or OpenAI-compatible) embedding provider
pub struct OpenAIEmbedding {
    client: Client<OpenAIConfig>,
    model_name: String,
    dimensions: usize,
}

impl OpenAIEmbedding {
    /// Create a new OpenAI embedding provider
    pub fn new(
        model_name: String,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, EmbeddingError> {
        let base_url = base_url.or_else(|| env::var("OPENAI_BASE_URL").ok());
        let api_key = api_key.or_else(|| env::var("OPENAI_API_KEY").ok());

        // Local OpenAI-compatible servers usually accept any key
        let api_key = match (api_key, &base_url) {
            (Some(key), _) => key,
            (None, Some(_)) => "not-needed".to_string(),
            (None, None) => {
                return Err(EmbeddingError::Unavailable("OPENAI_API_KEY not set".to_string()))
            }
        };

        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base_url) = base_url {
            config = config.with_api_base(base_url);
        }

        let client = Client::with_config(config);

        // Unknown models are detected from the first response
        let dimensions = match model_name.as_str() {
            "text-embedding-3-small" => 1536,
            "text-embedding-3-large" => 3072,
            "text-embedding-ada-002" => 1536,
            _ => 0,
        };

        info!(
            "OpenAI embedding provider: {} ({} dims)",
            model_name,
            if dimensions == 0 { "auto".to_string() } else { dimensions.to_string() }
        );

        Ok(Self {
            client,
            model_name,
            dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingProviderTrait for OpenAIEmbedding {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let input: Vec<String> = texts.iter().map(|s| s.to_string()).collect();
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model_name)
            .input(EmbeddingInput::StringArray(input))
            .build()
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| EmbeddingError::Request(format!("OpenAI: {}", e)))?;

        // The API reports an index per vector; restore input order
        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}
