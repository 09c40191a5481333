//! Query engine - free-text k-NN retrieval over a loaded corpus

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::embedding::EmbeddingAdapter;
use crate::error::{Error, Result};

use super::corpus::Corpus;

/// A ranked retrieval result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    #[serde(rename = "source")]
    pub source_id: String,
    #[serde(rename = "chunk_id")]
    pub ordinal: usize,
    pub text: String,
    /// Squared Euclidean distance to the query embedding
    pub distance: f32,
}

/// Read-only query session over one corpus
///
/// Queries never mutate the corpus, so one engine can serve concurrent
/// queries.
#[derive(Clone)]
pub struct QueryEngine {
    embedder: EmbeddingAdapter,
    corpus: Arc<Corpus>,
}

impl QueryEngine {
    pub fn new(embedder: EmbeddingAdapter, corpus: Arc<Corpus>) -> Self {
        Self { embedder, corpus }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    /// Check a known embedding dimension against the corpus dimension
    pub fn verify_dimensions(&self) -> Result<()> {
        match (self.embedder.dimensions(), self.corpus.dimension()) {
            (Some(model), Some(stored)) if model != stored => Err(Error::DimensionMismatch {
                expected: stored,
                actual: model,
                position: self.corpus.size(),
            }),
            _ => Ok(()),
        }
    }

    /// Return the `top_k` passages nearest to `text`, nearest first
    pub async fn query(&self, text: &str, top_k: usize) -> Result<Vec<QueryResult>> {
        if text.trim().is_empty() {
            return Err(Error::Query("query text is empty".to_string()));
        }
        if self.corpus.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let embedding = self.embedder.embed_one(text).await?;
        let neighbors = self.corpus.vectors().search(&embedding, top_k)?;

        debug!(
            "Query matched {} of {} passages",
            neighbors.len(),
            self.corpus.size()
        );

        neighbors
            .into_iter()
            .map(|neighbor| {
                let passage = self.corpus.passages().get(neighbor.position)?;
                Ok(QueryResult {
                    source_id: passage.source_id.clone(),
                    ordinal: passage.ordinal,
                    text: passage.text.clone(),
                    distance: neighbor.distance,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::embedding::{EmbeddingProviderTrait, SimulatedEmbedding};
    use crate::error::EmbeddingError;
    use crate::index::{Document, IndexBuilder, Passage, PassageStore, VectorIndex};

    struct CountingProvider {
        inner: SimulatedEmbedding,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingProviderTrait for CountingProvider {
        fn dimensions(&self) -> usize {
            self.inner.dimensions()
        }

        async fn embed(&self, texts: &[&str]) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed(texts).await
        }
    }

    fn counting(dimensions: usize) -> Arc<CountingProvider> {
        Arc::new(CountingProvider {
            inner: SimulatedEmbedding::new(dimensions).unwrap(),
            calls: AtomicUsize::new(0),
        })
    }

    async fn engine_for(documents: &[Document]) -> QueryEngine {
        let adapter = EmbeddingAdapter::new(counting(64));
        let corpus = IndexBuilder::new(&adapter, 100)
            .build(documents)
            .await
            .unwrap();
        QueryEngine::new(adapter, Arc::new(corpus))
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_embedding() {
        let provider = counting(8);
        let engine = QueryEngine::new(
            EmbeddingAdapter::new(provider.clone()),
            Arc::new(Corpus::default()),
        );

        for text in ["", "   ", "\n\t"] {
            assert!(matches!(engine.query(text, 3).await, Err(Error::Query(_))));
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_corpus_returns_nothing() {
        let engine = QueryEngine::new(
            EmbeddingAdapter::new(counting(8)),
            Arc::new(Corpus::default()),
        );
        assert!(engine.query("anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_single_entry_example() {
        let engine = engine_for(&[Document::new(
            "a.txt",
            "AI is fascinating. Privacy matters for AI.",
        )])
        .await;

        let results = engine.query("Tell me about AI privacy", 3).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].source_id, "a.txt");
        assert_eq!(results[0].ordinal, 0);
        assert_eq!(results[0].text, "AI is fascinating. Privacy matters for AI.");
        assert!(results[0].distance.is_finite() && results[0].distance >= 0.0);
    }

    #[tokio::test]
    async fn test_passage_is_its_own_nearest_neighbor() {
        let engine = engine_for(&[
            Document::new("a.txt", "Artificial Intelligence is fascinating."),
            Document::new("b.txt", "I love machine learning."),
            Document::new("c.txt", "Privacy is critical for AI applications."),
            Document::new("d.txt", "Python is a great programming language."),
            Document::new("e.txt", "NVIDIA GPUs accelerate deep learning."),
        ])
        .await;

        let results = engine
            .query("Privacy is critical for AI applications.", 5)
            .await
            .unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].source_id, "c.txt");
        assert_eq!(results[0].distance, 0.0);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[tokio::test]
    async fn test_results_follow_index_tie_break() {
        // Identical texts embed identically, so every distance ties
        let mut vectors = VectorIndex::new();
        let simulated = SimulatedEmbedding::new(8).unwrap();
        let same = simulated.embed_text("same words");
        vectors.insert(&[same.clone(), same.clone(), same]).unwrap();
        let passages = PassageStore::from_passages(vec![
            Passage::new("x.txt", 0, "same words"),
            Passage::new("y.txt", 0, "same words"),
            Passage::new("z.txt", 0, "same words"),
        ])
        .unwrap();
        let corpus = Corpus::from_parts(vectors, passages).unwrap();
        let engine = QueryEngine::new(EmbeddingAdapter::new(counting(8)), Arc::new(corpus));

        let results = engine.query("other words", 2).await.unwrap();
        let sources: Vec<&str> = results.iter().map(|r| r.source_id.as_str()).collect();
        assert_eq!(sources, vec!["x.txt", "y.txt"]);
    }

    #[tokio::test]
    async fn test_concurrent_queries() {
        let engine = engine_for(&[
            Document::new("a.txt", "Rust is fast."),
            Document::new("b.txt", "Python is popular."),
        ])
        .await;

        let queries = ["Rust speed", "Python popularity", "Rust is fast."];
        let results = futures::future::join_all(queries.iter().map(|q| engine.query(q, 1))).await;
        assert!(results.iter().all(|r| r.as_ref().is_ok_and(|v| v.len() == 1)));
        assert_eq!(results[2].as_ref().unwrap()[0].source_id, "a.txt");
    }

    #[tokio::test]
    async fn test_dimension_check() {
        let engine = engine_for(&[Document::new("a.txt", "Hello world.")]).await;
        assert!(engine.verify_dimensions().is_ok());

        let other = QueryEngine::new(
            EmbeddingAdapter::new(counting(32)),
            Arc::new(engine.corpus().clone()),
        );
        assert!(matches!(
            other.verify_dimensions(),
            Err(Error::DimensionMismatch { expected: 64, actual: 32, .. })
        ));
        assert!(matches!(
            other.query("Hello", 1).await,
            Err(Error::DimensionMismatch { .. })
        ));
    }
}
