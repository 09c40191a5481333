//! Exact vector index - flat storage with linear-scan k-NN search
//!
//! Vectors are stored contiguously in insertion order; storage position `i`
//! is the `i`-th inserted vector. Search computes squared Euclidean distance
//! to every stored vector and keeps the `k` best in a bounded max-heap.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{Error, Result};

/// A search hit: storage position and squared Euclidean distance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub position: usize,
    pub distance: f32,
}

/// Heap entry ordered by (distance, position); the heap top is the worst kept hit
#[derive(PartialEq)]
struct Candidate(Neighbor);

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .distance
            .total_cmp(&other.0.distance)
            .then_with(|| self.0.position.cmp(&other.0.position))
    }
}

/// Flat in-memory vector index with a fixed dimension
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VectorIndex {
    dimensions: Option<usize>,
    data: Vec<f32>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index whose dimension is already fixed
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            dimensions: Some(dimensions),
            data: Vec::new(),
        }
    }

    /// Rebuild an index from contiguous row-major data
    pub fn from_flat(dimensions: usize, data: Vec<f32>) -> Result<Self> {
        if dimensions == 0 || data.len() % dimensions != 0 {
            return Err(Error::CorpusIntegrity(format!(
                "{} floats is not a whole number of {}-dim vectors",
                data.len(),
                dimensions
            )));
        }
        Ok(Self {
            dimensions: Some(dimensions),
            data,
        })
    }

    /// Append vectors in order. All vectors are validated before any is stored.
    pub fn insert(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        let Some(first) = vectors.first() else {
            return Ok(());
        };
        let dimensions = self.dimensions.unwrap_or(first.len());
        let start = self.size();

        for (i, vector) in vectors.iter().enumerate() {
            if vector.len() != dimensions || dimensions == 0 {
                return Err(Error::DimensionMismatch {
                    expected: dimensions,
                    actual: vector.len(),
                    position: start + i,
                });
            }
        }

        self.dimensions = Some(dimensions);
        self.data.reserve(vectors.len() * dimensions);
        for vector in vectors {
            self.data.extend_from_slice(vector);
        }

        Ok(())
    }

    /// Find the `k` nearest stored vectors, nearest first.
    ///
    /// Equal distances resolve to the lower storage position. `k` is clamped
    /// to the index size; an empty index yields no results.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let Some(dimensions) = self.dimensions else {
            return Ok(Vec::new());
        };
        let k = k.min(self.size());
        if k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != dimensions {
            return Err(Error::DimensionMismatch {
                expected: dimensions,
                actual: query.len(),
                position: self.size(),
            });
        }

        let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);

        for (position, vector) in self.data.chunks_exact(dimensions).enumerate() {
            let candidate = Candidate(Neighbor {
                position,
                distance: squared_euclidean(query, vector),
            });

            if heap.len() < k {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                heap.pop();
                heap.push(candidate);
            }
        }

        Ok(heap.into_sorted_vec().into_iter().map(|c| c.0).collect())
    }

    /// Vector at a storage position
    pub fn get(&self, position: usize) -> Option<&[f32]> {
        let dimensions = self.dimensions?;
        let start = position.checked_mul(dimensions)?;
        self.data.get(start..start + dimensions)
    }

    /// Iterate stored vectors in storage order
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.dimensions.unwrap_or(1).max(1))
    }

    /// Number of stored vectors
    pub fn size(&self) -> usize {
        match self.dimensions {
            Some(d) if d > 0 => self.data.len() / d,
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Fixed dimension, `None` until the first insertion
    pub fn dimension(&self) -> Option<usize> {
        self.dimensions
    }

    /// Raw row-major storage
    pub fn as_flat(&self) -> &[f32] {
        &self.data
    }
}

/// Squared Euclidean distance, `sum((a_j - b_j)^2)`
pub fn squared_euclidean(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
