//! Random-hyperplane locality-sensitive hashing.
//!
//! `num_tables` tables each hash a vector to a `num_bits`-bit key: bit `b` is
//! set when the vector lies strictly on the positive side of that table's
//! `b`-th hyperplane. Vectors separated by a small angle tend to share keys,
//! so a query only scores the points in its own buckets.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use ndarray::{s, Array2, ArrayView1};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::config::{IndexConfig, IndexKind};
use crate::distance;
use crate::error::{Result, VectorDbError};
use crate::index::IndexStrategy;
use crate::top_k::{SearchResult, TopK};
use crate::vector::VectorCollection;

type Bucket = Vec<usize>;

/// LSH index: hyperplanes plus one bucket map per table.
#[derive(Debug)]
pub struct HashIndex {
    collection: Arc<VectorCollection>,
    /// `num_tables * num_bits` rows of `dim` Gaussian components.
    hyperplanes: Array2<f32>,
    tables: Vec<HashMap<u64, Bucket>>,
    num_bits: usize,
}

impl HashIndex {
    /// Hash every vector of `collection` into `num_tables` tables.
    ///
    /// The hyperplanes depend only on `seed`, the table shape and the
    /// dimension, so identical inputs rebuild identical tables.
    pub fn new(
        collection: Arc<VectorCollection>,
        num_tables: usize,
        num_bits: usize,
        seed: u64,
    ) -> Result<Self> {
        if num_tables == 0 || num_bits == 0 || num_bits > 64 {
            return Err(VectorDbError::InvalidConfig(format!(
                "hash index needs at least one table and 1..=64 bits, got {} tables x {} bits",
                num_tables, num_bits
            )));
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let hyperplanes = Array2::<f32>::random_using(
            (num_tables * num_bits, collection.dim()),
            StandardNormal,
            &mut rng,
        );

        let mut index = Self {
            collection,
            hyperplanes,
            tables: vec![HashMap::new(); num_tables],
            num_bits,
        };

        // Keys are computed in parallel; buckets are filled in index order.
        let keys: Vec<Vec<u64>> = (0..index.collection.len())
            .into_par_iter()
            .map(|i| index.keys(index.collection.get(i)))
            .collect();
        for (i, point_keys) in keys.into_iter().enumerate() {
            for (table, key) in index.tables.iter_mut().zip(point_keys) {
                table.entry(key).or_default().push(i);
            }
        }

        Ok(index)
    }

    pub fn num_tables(&self) -> usize {
        self.tables.len()
    }

    pub fn num_bits(&self) -> usize {
        self.num_bits
    }

    /// One key per table for `vector`.
    pub fn keys(&self, vector: &[f32]) -> Vec<u64> {
        let projections = self.hyperplanes.dot(&ArrayView1::from(vector));
        (0..self.tables.len())
            .map(|t| {
                projections
                    .slice(s![t * self.num_bits..(t + 1) * self.num_bits])
                    .iter()
                    .enumerate()
                    .fold(0u64, |key, (bit, &p)| {
                        if p > 0.0 {
                            key | (1u64 << bit)
                        } else {
                            key
                        }
                    })
            })
            .collect()
    }

    /// The bucket of `table` holding `key`, if any point hashed there.
    pub fn bucket(&self, table: usize, key: u64) -> Option<&[usize]> {
        self.tables
            .get(table)
            .and_then(|t| t.get(&key))
            .map(Vec::as_slice)
    }

    /// Union of the query's buckets across all tables, first-seen order.
    ///
    /// When fewer than `k` points collide with the query, unseen points are
    /// appended in index order until there are `2k` candidates or none left.
    pub fn candidates(&self, query: &[f32], k: usize) -> Vec<usize> {
        let mut seen = HashSet::new();
        let mut candidates = Vec::new();

        for (table, key) in self.tables.iter().zip(self.keys(query)) {
            if let Some(bucket) = table.get(&key) {
                for &i in bucket {
                    if seen.insert(i) {
                        candidates.push(i);
                    }
                }
            }
        }

        if candidates.len() < k {
            let target = k.saturating_mul(2);
            let extra = (0..self.collection.len()).filter(|i| !seen.contains(i));
            for i in extra {
                if candidates.len() >= target {
                    break;
                }
                candidates.push(i);
            }
        }

        candidates
    }
}

impl IndexStrategy for HashIndex {
    fn build(collection: Arc<VectorCollection>, config: &IndexConfig) -> Result<Self> {
        let index = Self::new(collection, config.num_tables, config.num_bits, config.seed)?;
        tracing::debug!(
            tables = index.num_tables(),
            bits = index.num_bits(),
            buckets = index.tables.iter().map(HashMap::len).sum::<usize>(),
            "hash tables built"
        );
        Ok(index)
    }

    fn query(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        self.check_dimension(query)?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut top = TopK::new(k);
        for i in self.candidates(query, k) {
            top.push(i, distance::score(query, self.collection.get(i)));
        }
        Ok(top.into_sorted_vec())
    }

    fn collection(&self) -> &VectorCollection {
        &self.collection
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Hash
    }
}
