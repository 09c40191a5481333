//! Metadata store - per-passage provenance, positionally aligned to the vector index

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single passage with its provenance
///
/// Serialized as `{source, chunk_id, text}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Originating document
    #[serde(rename = "source")]
    pub source_id: String,
    /// Position within the source document's passage sequence
    #[serde(rename = "chunk_id")]
    pub ordinal: usize,
    pub text: String,
}

impl Passage {
    pub fn new(source_id: impl Into<String>, ordinal: usize, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            ordinal,
            text: text.into(),
        }
    }
}

/// Append-only ordered passage store
#[derive(Debug, Clone, Default)]
pub struct PassageStore {
    passages: Vec<Passage>,
    keys: FxHashSet<(String, usize)>,
    sources: FxHashSet<String>,
}

impl PassageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted records, revalidating every record
    pub fn from_passages(passages: Vec<Passage>) -> Result<Self> {
        let mut store = Self::new();
        store.passages.reserve(passages.len());
        for passage in passages {
            store.append(passage)?;
        }
        Ok(store)
    }

    /// Check that a passage could be appended without storing it
    pub fn check(&self, passage: &Passage) -> Result<()> {
        if passage.text.trim().is_empty() {
            return Err(Error::InvalidPassage(format!(
                "{}#{} has empty text",
                passage.source_id, passage.ordinal
            )));
        }
        if self
            .keys
            .contains(&(passage.source_id.clone(), passage.ordinal))
        {
            return Err(Error::DuplicatePassage {
                source_id: passage.source_id.clone(),
                ordinal: passage.ordinal,
            });
        }
        Ok(())
    }

    /// Append a passage, returning its list position
    pub fn append(&mut self, passage: Passage) -> Result<usize> {
        self.check(&passage)?;
        let position = self.passages.len();
        self.keys
            .insert((passage.source_id.clone(), passage.ordinal));
        self.sources.insert(passage.source_id.clone());
        self.passages.push(passage);
        Ok(position)
    }

    /// Get the passage at a list position
    pub fn get(&self, position: usize) -> Result<&Passage> {
        self.passages.get(position).ok_or(Error::OutOfRange {
            position,
            size: self.passages.len(),
        })
    }

    /// Whether any passage from this source is stored
    pub fn contains_source(&self, source_id: &str) -> bool {
        self.sources.contains(source_id)
    }

    /// Number of distinct sources
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Passage> {
        self.passages.iter()
    }

    pub fn as_slice(&self) -> &[Passage] {
        &self.passages
    }

    pub fn size(&self) -> usize {
        self.passages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }
}
