//! Embedding adapter - the stable interface the index pipeline embeds through
//!
//! Splits inputs into batches, runs up to `max_concurrent_batches` of them at
//! once, and reassembles the results in input order. Every returned vector is
//! checked against the adapter's dimension, which is the provider's declared
//! dimension or, if the provider does not know it, the length of the first
//! vector it ever returns.

use std::sync::{Arc, OnceLock};

use futures::stream::{self, StreamExt, TryStreamExt};
use tracing::debug;

use crate::error::EmbeddingError;

use super::traits::EmbeddingProviderTrait;

/// Default number of texts per provider call
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Order-preserving, dimension-checking wrapper around an embedding provider
#[derive(Clone)]
pub struct EmbeddingAdapter {
    provider: Arc<dyn EmbeddingProviderTrait>,
    batch_size: usize,
    max_concurrent_batches: usize,
    dimensions: Arc<OnceLock<usize>>,
}

impl EmbeddingAdapter {
    pub fn new(provider: Arc<dyn EmbeddingProviderTrait>) -> Self {
        let dimensions = OnceLock::new();
        if provider.dimensions() > 0 {
            let _ = dimensions.set(provider.dimensions());
        }

        Self {
            provider,
            batch_size: DEFAULT_BATCH_SIZE,
            max_concurrent_batches: 1,
            dimensions: Arc::new(dimensions),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_max_concurrent_batches(mut self, max_concurrent_batches: usize) -> Self {
        self.max_concurrent_batches = max_concurrent_batches.max(1);
        self
    }

    /// Embedding dimension, if known yet
    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions.get().copied()
    }

    /// Embed texts; `result[i]` is the embedding of `texts[i]`
    pub async fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "Embedding {} texts in batches of {}",
            texts.len(),
            self.batch_size
        );

        let batches: Vec<Vec<Vec<f32>>> = stream::iter(texts.chunks(self.batch_size).enumerate())
            .map(|(batch_index, batch)| self.embed_batch(batch_index, batch))
            .buffered(self.max_concurrent_batches)
            .try_collect()
            .await?;

        Ok(batches.into_iter().flatten().collect())
    }

    /// Embed a single text
    pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embeddings = self.embed_many(&[text]).await?;
        embeddings.pop().ok_or(EmbeddingError::Count {
            expected: 1,
            actual: 0,
        })
    }

    async fn embed_batch(
        &self,
        batch_index: usize,
        batch: &[&str],
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let embeddings = self.provider.embed(batch).await?;

        if embeddings.len() != batch.len() {
            return Err(EmbeddingError::Count {
                expected: batch.len(),
                actual: embeddings.len(),
            });
        }

        let offset = batch_index * self.batch_size;
        for (i, embedding) in embeddings.iter().enumerate() {
            let expected = *self.dimensions.get_or_init(|| embedding.len());
            if embedding.len() != expected || expected == 0 {
                return Err(EmbeddingError::Dimension {
                    expected,
                    actual: embedding.len(),
                    input: offset + i,
                });
            }
        }

        Ok(embeddings)
    }
}
