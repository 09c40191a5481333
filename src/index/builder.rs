//! Index builder - chunk, embed and store documents in lock-step

use tracing::{debug, info};

use crate::chunker::SentenceChunker;
use crate::embedding::EmbeddingAdapter;
use crate::error::{Error, Result};

use super::corpus::Corpus;
use super::passages::{Passage, PassageStore};
use super::vector::VectorIndex;

/// A document whose text has already been extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub source_id: String,
    pub text: String,
}

impl Document {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

/// Builder for a [`Corpus`]
///
/// The builder is the only writer of its vector index and passage store.
/// Each document is either stored completely (every passage with its vector)
/// or not at all.
pub struct IndexBuilder<'a> {
    embedder: &'a EmbeddingAdapter,
    chunker: SentenceChunker,
    vectors: VectorIndex,
    passages: PassageStore,
    documents_indexed: usize,
    documents_skipped: usize,
}

impl<'a> IndexBuilder<'a> {
    pub fn new(embedder: &'a EmbeddingAdapter, max_tokens: usize) -> Self {
        let vectors = match embedder.dimensions() {
            Some(d) => VectorIndex::with_dimensions(d),
            None => VectorIndex::new(),
        };

        Self {
            embedder,
            chunker: SentenceChunker::new(max_tokens),
            vectors,
            passages: PassageStore::new(),
            documents_indexed: 0,
            documents_skipped: 0,
        }
    }

    /// Chunk, embed and store one document, returning its passage count
    ///
    /// Empty or whitespace-only documents are skipped without calling the
    /// embedding provider.
    pub async fn add_document(&mut self, source_id: &str, raw_text: &str) -> Result<usize> {
        if raw_text.trim().is_empty() {
            info!("No text extracted from {}", source_id);
            self.documents_skipped += 1;
            return Ok(0);
        }

        let texts = self.chunker.chunk(raw_text);
        if texts.is_empty() {
            self.documents_skipped += 1;
            return Ok(0);
        }

        let in_document = |e: Error| Error::Document {
            source_id: source_id.to_string(),
            source: Box::new(e),
        };

        if self.passages.contains_source(source_id) {
            return Err(in_document(Error::DuplicatePassage {
                source_id: source_id.to_string(),
                ordinal: 0,
            }));
        }

        let passages: Vec<Passage> = texts
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| Passage::new(source_id, ordinal, text))
            .collect();
        for passage in &passages {
            self.passages.check(passage).map_err(in_document)?;
        }

        let refs: Vec<&str> = passages.iter().map(|p| p.text.as_str()).collect();
        let embeddings = self
            .embedder
            .embed_many(&refs)
            .await
            .map_err(|e| in_document(e.into()))?;

        // Nothing has been stored yet; insert validates every vector first
        let start = self.vectors.size();
        self.vectors.insert(&embeddings).map_err(in_document)?;

        let count = passages.len();
        for (i, passage) in passages.into_iter().enumerate() {
            let position = self.passages.append(passage).map_err(in_document)?;
            debug_assert_eq!(position, start + i);
        }
        debug_assert_eq!(self.vectors.size(), self.passages.size());

        info!("File '{}' split into {} chunks.", source_id, count);
        self.documents_indexed += 1;
        Ok(count)
    }

    /// Number of passages stored so far
    pub fn len(&self) -> usize {
        self.passages.size()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn documents_indexed(&self) -> usize {
        self.documents_indexed
    }

    pub fn documents_skipped(&self) -> usize {
        self.documents_skipped
    }

    /// Finish the build. Fails if no document produced a passage.
    pub fn finish(self) -> Result<Corpus> {
        if self.passages.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        debug!(
            "Built corpus: {} passages from {} documents ({} skipped)",
            self.passages.size(),
            self.documents_indexed,
            self.documents_skipped
        );
        Corpus::from_parts(self.vectors, self.passages)
    }

    /// Build a corpus from documents in input order
    pub async fn build(mut self, documents: &[Document]) -> Result<Corpus> {
        for document in documents {
            self.add_document(&document.source_id, &document.text).await?;
        }
        self.finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::embedding::{EmbeddingProviderTrait, SimulatedEmbedding};
    use crate::error::EmbeddingError;

    /// Simulated embeddings that record inputs and can fail on a given call
    struct RecordingProvider {
        inner: SimulatedEmbedding,
        seen: Mutex<Vec<String>>,
        calls: AtomicUsize,
        fail_on_call: Option<usize>,
    }

    impl RecordingProvider {
        fn new(fail_on_call: Option<usize>) -> Arc<Self> {
            Arc::new(Self {
                inner: SimulatedEmbedding::new(16).unwrap(),
                seen: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
                fail_on_call,
            })
        }
    }

    #[async_trait]
    impl EmbeddingProviderTrait for RecordingProvider {
        fn dimensions(&self) -> usize {
            16
        }

        async fn embed(&self, texts: &[&str]) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if Some(call) == self.fail_on_call {
                return Err(EmbeddingError::Unavailable("model offline".to_string()));
            }
            self.seen
                .lock()
                .unwrap()
                .extend(texts.iter().map(|t| t.to_string()));
            self.inner.embed(texts).await
        }
    }

    fn documents() -> Vec<Document> {
        vec![
            Document::new(
                "a.txt",
                "One two three four. Five six seven eight. Nine ten eleven. Twelve thirteen.",
            ),
            Document::new("blank.txt", "  \n\t  "),
            Document::new("b.txt", "Privacy matters for AI. GPUs accelerate deep learning."),
        ]
    }

    #[tokio::test]
    async fn test_alignment_invariant() {
        let provider = RecordingProvider::new(None);
        let adapter = EmbeddingAdapter::new(provider.clone()).with_batch_size(2);
        let corpus = IndexBuilder::new(&adapter, 5)
            .build(&documents())
            .await
            .unwrap();

        let simulated = SimulatedEmbedding::new(16).unwrap();
        assert_eq!(corpus.size(), corpus.passages().size());
        for position in 0..corpus.size() {
            let (passage, vector) = corpus.entry(position).unwrap();
            assert_eq!(vector, simulated.embed_text(&passage.text).as_slice());
        }

        // Embedded texts, in order, are exactly the stored passage texts
        let stored: Vec<String> = corpus.passages().iter().map(|p| p.text.clone()).collect();
        assert_eq!(*provider.seen.lock().unwrap(), stored);
    }

    #[tokio::test]
    async fn test_ordinals_restart_per_document() {
        let adapter = EmbeddingAdapter::new(RecordingProvider::new(None));
        let corpus = IndexBuilder::new(&adapter, 5)
            .build(&documents())
            .await
            .unwrap();

        let keys: Vec<(&str, usize)> = corpus
            .passages()
            .iter()
            .map(|p| (p.source_id.as_str(), p.ordinal))
            .collect();
        assert_eq!(keys, vec![("a.txt", 0), ("a.txt", 1), ("b.txt", 0)]);
    }

    #[tokio::test]
    async fn test_blank_document_never_embedded() {
        let provider = RecordingProvider::new(None);
        let adapter = EmbeddingAdapter::new(provider.clone());
        let mut builder = IndexBuilder::new(&adapter, 200);

        assert_eq!(builder.add_document("blank.txt", " \n ").await.unwrap(), 0);
        assert_eq!(builder.add_document("empty.txt", "").await.unwrap(), 0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert_eq!(builder.documents_skipped(), 2);
        assert!(builder.is_empty());
    }

    #[tokio::test]
    async fn test_empty_corpus_error() {
        let adapter = EmbeddingAdapter::new(RecordingProvider::new(None));
        let result = IndexBuilder::new(&adapter, 200)
            .build(&[Document::new("blank.txt", "   ")])
            .await;
        assert!(matches!(result, Err(Error::EmptyCorpus)));
    }

    #[tokio::test]
    async fn test_embedding_failure_leaves_no_partial_document() {
        // Second provider call (the second document) fails
        let adapter = EmbeddingAdapter::new(RecordingProvider::new(Some(1)));
        let mut builder = IndexBuilder::new(&adapter, 200);

        builder.add_document("a.txt", "First document.").await.unwrap();
        let err = builder
            .add_document("b.txt", "Second document. More text.")
            .await
            .unwrap_err();

        match err {
            Error::Document { source_id, source } => {
                assert_eq!(source_id, "b.txt");
                assert!(matches!(*source, Error::Embedding(EmbeddingError::Unavailable(_))));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(builder.len(), 1);

        let corpus = builder.finish().unwrap();
        assert_eq!(corpus.vectors().size(), 1);
        assert_eq!(corpus.passages().get(0).unwrap().source_id, "a.txt");
    }

    #[tokio::test]
    async fn test_duplicate_source_rejected() {
        let adapter = EmbeddingAdapter::new(RecordingProvider::new(None));
        let mut builder = IndexBuilder::new(&adapter, 200);
        builder.add_document("a.txt", "Hello there.").await.unwrap();

        let err = builder.add_document("a.txt", "Hello again.").await.unwrap_err();
        assert!(matches!(err, Error::Document { .. }));
        assert_eq!(builder.len(), 1);
    }

    #[tokio::test]
    async fn test_end_to_end_example_passage() {
        let adapter = EmbeddingAdapter::new(RecordingProvider::new(None));
        let corpus = IndexBuilder::new(&adapter, 100)
            .build(&[Document::new("a.txt", "AI is fascinating. Privacy matters for AI.")])
            .await
            .unwrap();

        assert_eq!(corpus.size(), 1);
        assert_eq!(
            corpus.passages().get(0).unwrap(),
            &Passage::new("a.txt", 0, "AI is fascinating. Privacy matters for AI.")
        );
    }
}
