//! Index trait for pluggable search strategies

use std::sync::Arc;

use crate::config::{IndexConfig, IndexKind};
use crate::error::{Result, VectorDbError};
use crate::flat_index::FlatIndex;
use crate::hash_index::HashIndex;
use crate::spatial_tree::SpatialTreeIndex;
use crate::top_k::SearchResult;
use crate::vector::VectorCollection;

/// A searchable structure built once over a normalized collection.
///
/// Indexes are immutable after `build`, so queries need no synchronization.
/// The trait is object-safe so the server can hold a `Box<dyn IndexStrategy>`
/// when the strategy is chosen at runtime.
pub trait IndexStrategy: Send + Sync {
    /// Build the index over `collection`, whose rows must already be normalized.
    fn build(collection: Arc<VectorCollection>, config: &IndexConfig) -> Result<Self>
    where
        Self: Sized;

    /// Return up to `k` neighbors of the normalized `query`, best first.
    fn query(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    /// Return up to `k` neighbors of the stored vector at `index`, excluding
    /// that vector itself.
    fn query_item(&self, index: usize, k: usize) -> Result<Vec<SearchResult>> {
        let len = self.len();
        if index >= len {
            return Err(VectorDbError::ItemOutOfRange { index, len });
        }
        let query = self.collection().get(index);
        let mut results = self.query(query, k.saturating_add(1))?;
        results.retain(|r| r.index != index);
        results.truncate(k);
        Ok(results)
    }

    /// The collection this index searches.
    fn collection(&self) -> &VectorCollection;

    /// Which strategy this is.
    fn kind(&self) -> IndexKind;

    /// The number of vectors in this index.
    fn len(&self) -> usize {
        self.collection().len()
    }

    /// Whether the index is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reject queries whose width differs from the indexed vectors.
    fn check_dimension(&self, query: &[f32]) -> Result<()> {
        let expected = self.collection().dim();
        if query.len() != expected {
            return Err(VectorDbError::DimensionMismatch {
                expected,
                actual: query.len(),
            });
        }
        Ok(())
    }
}

/// Build the strategy selected by `config.index`.
pub fn build_index(
    collection: Arc<VectorCollection>,
    config: &IndexConfig,
) -> Result<Box<dyn IndexStrategy>> {
    config.validate()?;
    if collection.dim() != config.dimension {
        return Err(VectorDbError::DimensionMismatch {
            expected: config.dimension,
            actual: collection.dim(),
        });
    }

    let index: Box<dyn IndexStrategy> = match config.index {
        IndexKind::Flat => Box::new(FlatIndex::build(collection, config)?),
        IndexKind::Tree => Box::new(SpatialTreeIndex::build(collection, config)?),
        IndexKind::Hash => Box::new(HashIndex::build(collection, config)?),
    };
    Ok(index)
}
