//! Corpus - the aligned pair of vector index and passage store
//!
//! Storage position `i` in the vector index and list position `i` in the
//! passage store always describe the same passage. Every constructor checks
//! that both sides have the same length.
//!
//! On disk a corpus is three files sharing a base path:
//! - `<base>.vectors`: N * D little-endian f32
//! - `<base>.passages.json`: `[{source, chunk_id, text}, ...]`
//! - `<base>.meta.json`: [`IndexMeta`]

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};

use super::embeddings::{read_vectors, write_vectors};
use super::meta::IndexMeta;
use super::passages::{Passage, PassageStore};
use super::vector::VectorIndex;

/// Base file name of a corpus inside its index directory
pub const CORPUS_BASENAME: &str = "corpus";

/// Paths of the three corpus files
#[derive(Debug, Clone)]
pub struct CorpusPaths {
    pub vectors: PathBuf,
    pub passages: PathBuf,
    pub meta: PathBuf,
}

impl CorpusPaths {
    pub fn in_dir(index_dir: &Path) -> Self {
        let base = index_dir.join(CORPUS_BASENAME);
        Self {
            vectors: base.with_extension("vectors"),
            passages: base.with_extension("passages.json"),
            meta: base.with_extension("meta.json"),
        }
    }

    /// Whether a complete corpus is present
    pub fn exists(&self) -> bool {
        self.vectors.exists() && self.passages.exists() && self.meta.exists()
    }
}

/// An aligned vector index and passage store
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    vectors: VectorIndex,
    passages: PassageStore,
}

impl Corpus {
    /// Pair a vector index with a passage store of the same length
    pub fn from_parts(vectors: VectorIndex, passages: PassageStore) -> Result<Self> {
        if vectors.size() != passages.size() {
            return Err(Error::CorpusIntegrity(format!(
                "{} vectors but {} passages",
                vectors.size(),
                passages.size()
            )));
        }
        Ok(Self { vectors, passages })
    }

    pub fn vectors(&self) -> &VectorIndex {
        &self.vectors
    }

    pub fn passages(&self) -> &PassageStore {
        &self.passages
    }

    /// Number of entries
    pub fn size(&self) -> usize {
        self.vectors.size()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn dimension(&self) -> Option<usize> {
        self.vectors.dimension()
    }

    /// The passage and vector stored at a position
    pub fn entry(&self, position: usize) -> Result<(&Passage, &[f32])> {
        let passage = self.passages.get(position)?;
        let vector = self.vectors.get(position).ok_or(Error::OutOfRange {
            position,
            size: self.vectors.size(),
        })?;
        Ok((passage, vector))
    }

    /// Persist the corpus and its metadata into `index_dir`
    pub fn save(&self, index_dir: &Path, meta: &IndexMeta) -> Result<()> {
        let dimensions = self.dimension().ok_or(Error::EmptyCorpus)?;
        if meta.dimensions != dimensions || meta.passage_count != self.size() {
            return Err(Error::CorpusIntegrity(format!(
                "metadata describes {} x {} but corpus is {} x {}",
                meta.passage_count,
                meta.dimensions,
                self.size(),
                dimensions
            )));
        }

        std::fs::create_dir_all(index_dir)?;
        let paths = CorpusPaths::in_dir(index_dir);

        write_vectors(&paths.vectors, &self.vectors, dimensions)?;

        let mut writer = BufWriter::new(File::create(&paths.passages)?);
        serde_json::to_writer_pretty(&mut writer, self.passages.as_slice())?;
        writer.flush()?;

        meta.save(&paths.meta)?;

        info!(
            "Saved corpus: {} passages, {} dims at {:?}",
            self.size(),
            dimensions,
            index_dir
        );
        Ok(())
    }

    /// Load a corpus from `index_dir`, verifying vector/passage alignment
    pub fn load(index_dir: &Path) -> Result<(Self, IndexMeta)> {
        let paths = CorpusPaths::in_dir(index_dir);
        info!("Loading corpus from {:?}", index_dir);

        let meta = IndexMeta::load(&paths.meta)?;
        let vectors = read_vectors(&paths.vectors, meta.dimensions)?;

        let reader = BufReader::new(File::open(&paths.passages)?);
        let records: Vec<Passage> = serde_json::from_reader(reader).map_err(|e| {
            Error::CorpusIntegrity(format!("malformed passage records: {}", e))
        })?;
        let passages = PassageStore::from_passages(records)
            .map_err(|e| Error::CorpusIntegrity(e.to_string()))?;

        if passages.size() != meta.passage_count {
            return Err(Error::CorpusIntegrity(format!(
                "metadata records {} passages but {} were found",
                meta.passage_count,
                passages.size()
            )));
        }

        let corpus = Self::from_parts(vectors, passages)?;

        info!(
            "Loaded corpus with {} passages ({} dims)",
            corpus.size(),
            meta.dimensions
        );
        Ok((corpus, meta))
    }
}
