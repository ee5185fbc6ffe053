//! Brute-force flat index — O(n) k-NN search

use std::sync::Arc;

use rayon::prelude::*;

use crate::config::{IndexConfig, IndexKind};
use crate::distance;
use crate::error::Result;
use crate::index::IndexStrategy;
use crate::top_k::{select_top_k, SearchResult};
use crate::vector::VectorCollection;

/// Below this many vectors a query is scored on the calling thread.
const PARALLEL_THRESHOLD: usize = 4096;

/// A flat (brute-force) index that scores every stored vector.
///
/// Results are exact, which makes this the ground truth the other
/// strategies are measured against.
#[derive(Debug)]
pub struct FlatIndex {
    collection: Arc<VectorCollection>,
}

impl FlatIndex {
    pub fn new(collection: Arc<VectorCollection>) -> Self {
        Self { collection }
    }

    fn score_all(&self, query: &[f32]) -> Vec<SearchResult> {
        let collection = &self.collection;
        let score_one = |i: usize| SearchResult::new(i, distance::score(query, collection.get(i)));

        if collection.len() < PARALLEL_THRESHOLD {
            (0..collection.len()).map(score_one).collect()
        } else {
            (0..collection.len()).into_par_iter().map(score_one).collect()
        }
    }
}

impl IndexStrategy for FlatIndex {
    fn build(collection: Arc<VectorCollection>, _config: &IndexConfig) -> Result<Self> {
        Ok(Self::new(collection))
    }

    fn query(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        self.check_dimension(query)?;
        if k == 0 {
            return Ok(Vec::new());
        }
        Ok(select_top_k(self.score_all(query), k))
    }

    fn collection(&self) -> &VectorCollection {
        &self.collection
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Flat
    }
}
