//! Simulated embeddings for offline use and testing
//!
//! Feature-hashes lowercase word tokens into a fixed number of buckets and
//! L2-normalizes the result. Deterministic, so texts sharing words land
//! closer together than unrelated texts.

use std::hash::Hasher;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use rustc_hash::FxHasher;

use crate::error::EmbeddingError;

use super::traits::EmbeddingProviderTrait;

/// Default dimension, matching all-MiniLM-L6-v2
pub const DEFAULT_DIMENSIONS: usize = 384;

static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[[:alnum:]]+").expect("static token pattern")
});

/// Simulated embedding provider
pub struct SimulatedEmbedding {
    dimensions: usize,
}

impl SimulatedEmbedding {
    pub fn new(dimensions: usize) -> Result<Self, EmbeddingError> {
        if dimensions == 0 {
            return Err(EmbeddingError::Unavailable(
                "simulated embeddings need at least one dimension".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    /// Embed a single text
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in TOKEN_REGEX.find_iter(text) {
            let token = token.as_str().to_lowercase();
            let mut hasher = FxHasher::default();
            hasher.write(token.as_bytes());
            let hash = hasher.finish();

            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }

        vector
    }
}

#[async_trait]
impl EmbeddingProviderTrait for SimulatedEmbedding {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
