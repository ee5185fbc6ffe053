//! Fixed-dimension vector collection

use crate::distance;
use crate::error::{Result, VectorDbError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// An ordered collection of `len()` embeddings, each exactly `dim()` floats wide.
///
/// Rows are stored back to back in a single buffer and identified by their
/// position; the collection never grows or shrinks after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorCollection {
    data: Vec<f32>,
    dim: usize,
    len: usize,
}

impl VectorCollection {
    /// Wrap a row-major buffer holding `len` rows of `dim` floats.
    pub fn from_flat(data: Vec<f32>, len: usize, dim: usize) -> Result<Self> {
        let expected = len
            .checked_mul(dim)
            .ok_or(VectorDbError::SizeOverflow { n: len, dim })?;
        if data.len() != expected {
            return Err(VectorDbError::DimensionMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, dim, len })
    }

    /// Build a collection from individual rows, which must all be `dim` wide.
    pub fn from_rows(rows: &[Vec<f32>], dim: usize) -> Result<Self> {
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            if row.len() != dim {
                return Err(VectorDbError::DimensionMismatch {
                    expected: dim,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            dim,
            len: rows.len(),
        })
    }

    /// Generate `len` vectors with components drawn uniformly from `[0, 1)`.
    ///
    /// The same seed always yields the same collection.
    pub fn random(len: usize, dim: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..len * dim).map(|_| rng.gen::<f32>()).collect();
        Self { data, dim, len }
    }

    /// Number of vectors
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Width of every vector
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The row at `index`. Panics when out of range.
    #[inline]
    pub fn get(&self, index: usize) -> &[f32] {
        let start = index * self.dim;
        &self.data[start..start + self.dim]
    }

    /// Iterate over rows in index order.
    pub fn iter(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.len).map(move |i| self.get(i))
    }

    /// All components, row after row.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// L2-normalize every row in place. Zero rows stay zero.
    pub fn normalize(&mut self) {
        if self.dim == 0 {
            return;
        }
        self.data
            .par_chunks_mut(self.dim)
            .for_each(distance::normalize);
    }
}
