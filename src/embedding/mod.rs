//! Embedding module - compute embeddings from text

mod adapter;
mod ollama;
mod openai;
mod simulated;
mod traits;

#[cfg(feature = "local-embeddings")]
mod candle;

pub use adapter::{EmbeddingAdapter, DEFAULT_BATCH_SIZE};
pub use simulated::{SimulatedEmbedding, DEFAULT_DIMENSIONS as SIMULATED_DIMENSIONS};
pub use traits::EmbeddingProviderTrait;

#[cfg(feature = "local-embeddings")]
pub use candle::DEFAULT_LOCAL_MODEL;

use std::sync::Arc;

use tracing::info;

use crate::error::EmbeddingError;

/// Embedding mode configuration
#[derive(Debug, Clone)]
pub enum EmbeddingMode {
    OpenAI {
        api_key: Option<String>,
        base_url: Option<String>,
    },
    Ollama {
        host: Option<String>,
    },
    Simulated {
        dimensions: usize,
    },
    #[cfg(feature = "local-embeddings")]
    Local {
        model_path: Option<String>,
    },
}

impl EmbeddingMode {
    /// Provider name as stored in index metadata
    pub fn name(&self) -> &'static str {
        match self {
            EmbeddingMode::OpenAI { .. } => "openai",
            EmbeddingMode::Ollama { .. } => "ollama",
            EmbeddingMode::Simulated { .. } => "simulated",
            #[cfg(feature = "local-embeddings")]
            EmbeddingMode::Local { .. } => "local",
        }
    }
}

/// Create an embedding provider for a model and mode
pub fn create_provider(
    model_name: &str,
    mode: EmbeddingMode,
) -> Result<Arc<dyn EmbeddingProviderTrait>, EmbeddingError> {
    let provider: Arc<dyn EmbeddingProviderTrait> = match mode {
        EmbeddingMode::OpenAI { api_key, base_url } => Arc::new(openai::OpenAIEmbedding::new(
            model_name.to_string(),
            api_key,
            base_url,
        )?),
        EmbeddingMode::Ollama { host } => {
            Arc::new(ollama::OllamaEmbedding::new(model_name.to_string(), host)?)
        }
        EmbeddingMode::Simulated { dimensions } => Arc::new(SimulatedEmbedding::new(dimensions)?),
        #[cfg(feature = "local-embeddings")]
        EmbeddingMode::Local { model_path } => Arc::new(candle::CandleEmbedding::new(
            model_name.to_string(),
            model_path,
        )?),
    };

    info!(
        "Initialized embedding provider: {} ({} dims)",
        model_name,
        match provider.dimensions() {
            0 => "auto".to_string(),
            d => d.to_string(),
        }
    );

    Ok(provider)
}
