//! Embedding provider traits

use async_trait::async_trait;

use crate::error::EmbeddingError;

/// Trait for embedding providers
#[async_trait]
pub trait EmbeddingProviderTrait: Send + Sync {
    /// Get embedding dimensions (0 if unknown until the first call)
    fn dimensions(&self) -> usize;

    /// Compute embeddings for texts, one vector per input in input order
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}
