//! Index metadata handling

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Current on-disk format version
pub const FORMAT_VERSION: &str = "1.0";

/// Index metadata stored alongside the corpus files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMeta {
    /// Metadata format version
    pub version: String,

    /// Embedding provider (ollama, openai, simulated, local)
    pub embedding_provider: String,

    /// Embedding model name
    pub embedding_model: String,

    /// Embedding dimensions
    pub dimensions: usize,

    /// Total number of passages
    pub passage_count: usize,

    /// Number of documents that produced passages
    #[serde(default)]
    pub source_count: usize,

    /// Chunk size used at build time
    pub max_tokens: usize,
}

impl IndexMeta {
    /// Load metadata from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let meta: IndexMeta = serde_json::from_str(&content)?;
        Ok(meta)
    }

    /// Save metadata to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
