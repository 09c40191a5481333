//! memdex - local document indexing and semantic retrieval
//!
//! Documents are split into sentence-aligned passages, embedded, and stored
//! in an exact nearest-neighbor index aligned position-for-position with the
//! passage records. Queries return the `top_k` passages closest to a
//! free-text question.

pub mod chunker;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod extract;
mod http;
pub mod index;

pub use error::{EmbeddingError, Error, ExtractionError, Result};
