//! Vector file storage - memory-mapped little-endian f32 rows
//!
//! The file holds `N * D` floats in storage order with no header; the
//! dimension comes from the index metadata. Rows are decoded straight out
//! of the map into the index, so no intermediate byte buffer is allocated.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use memmap2::Mmap;
use tracing::debug;

use crate::error::{Error, Result};

use super::vector::VectorIndex;

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Writer for a vector file
pub struct EmbeddingsWriter {
    writer: BufWriter<File>,
    dimensions: usize,
    count: usize,
}

impl EmbeddingsWriter {
    /// Create a new vector file
    pub fn create(path: &Path, dimensions: usize) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            dimensions,
            count: 0,
        })
    }

    /// Append one vector
    pub fn add(&mut self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimensions {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions,
                actual: embedding.len(),
                position: self.count,
            });
        }

        for value in embedding {
            self.writer.write_all(&value.to_le_bytes())?;
        }
        self.count += 1;

        Ok(())
    }

    /// Flush and return the number of vectors written
    pub fn finish(mut self) -> Result<usize> {
        self.writer.flush()?;
        Ok(self.count)
    }
}

/// Write every vector of an index to `path`
pub fn write_vectors(path: &Path, index: &VectorIndex, dimensions: usize) -> Result<usize> {
    let mut writer = EmbeddingsWriter::create(path, dimensions)?;
    for vector in index.iter() {
        writer.add(vector)?;
    }
    let count = writer.finish()?;
    debug!("Wrote {} vectors to {:?}", count, path);
    Ok(count)
}

/// Read a vector file into an index of the given dimension
pub fn read_vectors(path: &Path, dimensions: usize) -> Result<VectorIndex> {
    if dimensions == 0 {
        return Err(Error::CorpusIntegrity(
            "index metadata records zero dimensions".to_string(),
        ));
    }

    let row_bytes = dimensions.checked_mul(F32_BYTES).ok_or_else(|| {
        Error::CorpusIntegrity(format!(
            "index metadata records {} dimensions, too many to address",
            dimensions
        ))
    })?;

    let file = File::open(path)?;
    let len = usize::try_from(file.metadata()?.len()).map_err(|_| {
        Error::CorpusIntegrity(format!("vector file {:?} is too large to map", path))
    })?;

    if len % row_bytes != 0 {
        return Err(Error::CorpusIntegrity(format!(
            "vector file {:?} is {} bytes, not a multiple of {} ({}-dim rows)",
            path, len, row_bytes, dimensions
        )));
    }

    if len == 0 {
        return Ok(VectorIndex::with_dimensions(dimensions));
    }

    // Safety: the file is opened read-only and not modified while mapped
    let mmap = unsafe { Mmap::map(&file)? };
    let data: Vec<f32> = mmap
        .chunks_exact(F32_BYTES)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();

    VectorIndex::from_flat(dimensions, data)
}
