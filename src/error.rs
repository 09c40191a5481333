//! Error types for memdex.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for indexing and retrieval.
#[derive(Error, Debug)]
pub enum Error {
    /// The embedding adapter could not produce vectors
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// A vector does not have the index's fixed dimension
    #[error("dimension mismatch at position {position}: expected {expected}, got {actual}")]
    DimensionMismatch {
        expected: usize,
        actual: usize,
        position: usize,
    },

    /// A storage position beyond the bounds of a store
    #[error("position {position} out of range (size {size})")]
    OutOfRange { position: usize, size: usize },

    /// Persisted vectors and metadata disagree
    #[error("corpus integrity error: {0}")]
    CorpusIntegrity(String),

    /// A build produced nothing indexable
    #[error("no documents produced any passages; nothing to index")]
    EmptyCorpus,

    /// Invalid query input
    #[error("invalid query: {0}")]
    Query(String),

    /// `(source_id, ordinal)` already present in the metadata store
    #[error("duplicate passage: {source_id}#{ordinal}")]
    DuplicatePassage { source_id: String, ordinal: usize },

    /// A passage that cannot be stored (e.g. empty text)
    #[error("invalid passage: {0}")]
    InvalidPassage(String),

    /// Indexing one document failed; nothing from it was stored
    #[error("document '{source_id}': {source}")]
    Document {
        source_id: String,
        source: Box<Error>,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Embedding errors.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Model could not be loaded or reached
    #[error("embedding model unavailable: {0}")]
    Unavailable(String),

    /// The provider rejected or failed a request
    #[error("embedding request failed: {0}")]
    Request(String),

    /// The provider returned a vector of the wrong length
    #[error("input {input}: expected {expected}-dim embedding, got {actual}")]
    Dimension {
        expected: usize,
        actual: usize,
        input: usize,
    },

    /// The provider returned the wrong number of vectors
    #[error("expected {expected} embeddings, got {actual}")]
    Count { expected: usize, actual: usize },
}

/// Content extraction errors. Recovered by the document loader.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),

    #[error("failed to extract {path}: {reason}")]
    Failed { path: PathBuf, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    pub(crate) fn failed(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        Self::Failed {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
