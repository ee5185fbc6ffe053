//! Spatial partitioning tree: a k-d style median split over point indices.
//!
//! Each internal node splits on dimension `depth % dim` at the median value
//! of that coordinate. Queries walk the tree depth first, nearest side of each
//! pivot first, and feed leaf points into a bounded [`TopK`].
//!
//! The far-side test compares `(q[dim] - pivot)^2`, a Euclidean quantity,
//! against the current worst cosine score in the top-k. The two are not in
//! the same metric space, so the prune is a heuristic: it can skip a subtree
//! holding a true top-k member. Results are exact only when the tree is a
//! single leaf or the top-k never fills (k >= n).

use std::sync::Arc;

use crate::config::{IndexConfig, IndexKind};
use crate::distance;
use crate::error::Result;
use crate::index::IndexStrategy;
use crate::top_k::{SearchResult, TopK};
use crate::vector::VectorCollection;

/// A tree node. Children are exclusively owned; an empty partition has no child.
#[derive(Debug)]
enum Node {
    Leaf {
        points: Vec<usize>,
    },
    Internal {
        split_dim: usize,
        pivot: f32,
        left: Option<Box<Node>>,
        right: Option<Box<Node>>,
    },
}

/// Tree-backed index over a normalized collection.
#[derive(Debug)]
pub struct SpatialTreeIndex {
    collection: Arc<VectorCollection>,
    root: Option<Box<Node>>,
    leaf_capacity: usize,
}

impl SpatialTreeIndex {
    pub fn new(collection: Arc<VectorCollection>, leaf_capacity: usize) -> Self {
        let leaf_capacity = leaf_capacity.max(1);
        let points: Vec<usize> = (0..collection.len()).collect();
        let root = if points.is_empty() || collection.dim() == 0 {
            None
        } else {
            Some(Box::new(build_node(&collection, points, 0, 0, leaf_capacity)))
        };
        Self {
            collection,
            root,
            leaf_capacity,
        }
    }

    pub fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    /// Depth of the deepest leaf; 0 for a single leaf or an empty tree.
    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Internal { left, right, .. } => {
                    let l = left.as_deref().map(walk).unwrap_or(0);
                    let r = right.as_deref().map(walk).unwrap_or(0);
                    1 + l.max(r)
                }
            }
        }
        self.root.as_deref().map(walk).unwrap_or(0)
    }

    /// Sizes of every leaf, left to right.
    pub fn leaf_sizes(&self) -> Vec<usize> {
        fn walk(node: &Node, out: &mut Vec<usize>) {
            match node {
                Node::Leaf { points } => out.push(points.len()),
                Node::Internal { left, right, .. } => {
                    if let Some(l) = left {
                        walk(l, out);
                    }
                    if let Some(r) = right {
                        walk(r, out);
                    }
                }
            }
        }
        let mut out = Vec::new();
        if let Some(root) = &self.root {
            walk(root, &mut out);
        }
        out
    }

    fn search(&self, node: &Node, query: &[f32], top: &mut TopK) {
        match node {
            Node::Leaf { points } => {
                for &i in points {
                    top.push(i, distance::score(query, self.collection.get(i)));
                }
            }
            Node::Internal {
                split_dim,
                pivot,
                left,
                right,
            } => {
                let value = query[*split_dim];
                let (near, far) = if value < *pivot {
                    (left, right)
                } else {
                    (right, left)
                };

                if let Some(near) = near {
                    self.search(near, query, top);
                }
                if let Some(far) = far {
                    let diff = value - pivot;
                    if !top.is_full() || diff * diff <= top.worst_score() {
                        self.search(far, query, top);
                    }
                }
            }
        }
    }
}

/// Recursively partition `points`.
///
/// `stalled` counts consecutive levels whose split left one side empty; after
/// `dim` of them every coordinate is tied, so the points become one leaf.
fn build_node(
    collection: &VectorCollection,
    points: Vec<usize>,
    depth: usize,
    stalled: usize,
    leaf_capacity: usize,
) -> Node {
    let dim = collection.dim();
    if points.len() <= leaf_capacity || stalled >= dim {
        return Node::Leaf { points };
    }

    let split_dim = depth % dim;
    let pivot = median(collection, &points, split_dim);

    let (left, right): (Vec<usize>, Vec<usize>) = points
        .into_iter()
        .partition(|&i| collection.get(i)[split_dim] < pivot);

    let stalled = if left.is_empty() || right.is_empty() {
        stalled + 1
    } else {
        0
    };
    let child = |side: Vec<usize>| {
        if side.is_empty() {
            None
        } else {
            Some(Box::new(build_node(
                collection,
                side,
                depth + 1,
                stalled,
                leaf_capacity,
            )))
        }
    };

    Node::Internal {
        split_dim,
        pivot,
        left: child(left),
        right: child(right),
    }
}

/// Upper median of coordinate `split_dim` over `points`, by selection.
fn median(collection: &VectorCollection, points: &[usize], split_dim: usize) -> f32 {
    let mut values: Vec<f32> = points
        .iter()
        .map(|&i| collection.get(i)[split_dim])
        .collect();
    let mid = values.len() / 2;
    let (_, m, _) = values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
    *m
}

impl IndexStrategy for SpatialTreeIndex {
    fn build(collection: Arc<VectorCollection>, config: &IndexConfig) -> Result<Self> {
        let index = Self::new(collection, config.leaf_capacity);
        tracing::debug!(
            depth = index.depth(),
            leaves = index.leaf_sizes().len(),
            "spatial tree built"
        );
        Ok(index)
    }

    fn query(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        self.check_dimension(query)?;
        let mut top = TopK::new(k);
        if k > 0 {
            if let Some(root) = &self.root {
                self.search(root, query, &mut top);
            }
        }
        Ok(top.into_sorted_vec())
    }

    fn collection(&self) -> &VectorCollection {
        &self.collection
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flat_index::FlatIndex;

    fn normalized(n: usize, dim: usize, seed: u64) -> Arc<VectorCollection> {
        let mut c = VectorCollection::random(n, dim, seed);
        c.normalize();
        Arc::new(c)
    }

    #[test]
    fn test_leaves_respect_capacity() {
        let tree = SpatialTreeIndex::new(normalized(1000, 8, 1), 32);
        let sizes = tree.leaf_sizes();
        assert_eq!(sizes.iter().sum::<usize>(), 1000);
        assert!(sizes.iter().all(|&s| s > 0 && s <= 32));
        assert!(tree.depth() > 0);
    }

    #[test]
    fn test_small_collection_is_single_leaf() {
        let tree = SpatialTreeIndex::new(normalized(20, 4, 2), 32);
        assert_eq!(tree.leaf_sizes(), vec![20]);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn test_empty_collection() {
        let tree = SpatialTreeIndex::new(normalized(0, 4, 0), 32);
        assert!(tree.leaf_sizes().is_empty());
        assert!(tree.query(&[1.0, 0.0, 0.0, 0.0], 5).unwrap().is_empty());
    }

    #[test]
    fn test_identical_points_terminate() {
        let rows = vec![vec![0.5f32, 0.5]; 100];
        let c = Arc::new(VectorCollection::from_rows(&rows, 2).unwrap());
        let tree = SpatialTreeIndex::new(c, 4);
        assert_eq!(tree.leaf_sizes().iter().sum::<usize>(), 100);

        let results = tree.query(&[0.5, 0.5], 3).unwrap();
        let order: Vec<usize> = results.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![99, 98, 97]);
    }

    #[test]
    fn test_median_split_sides() {
        let rows: Vec<Vec<f32>> = (0..10).map(|i| vec![i as f32, 0.0]).collect();
        let c = VectorCollection::from_rows(&rows, 2).unwrap();
        let points: Vec<usize> = (0..10).collect();
        assert_eq!(median(&c, &points, 0), 5.0);
    }

    #[test]
    fn test_exact_when_k_covers_collection() {
        let c = normalized(300, 6, 9);
        let tree = SpatialTreeIndex::new(c.clone(), 8);
        let flat = FlatIndex::new(c.clone());
        let query = c.get(42).to_vec();

        let from_tree = tree.query(&query, 300).unwrap();
        let from_flat = flat.query(&query, 300).unwrap();
        let t: Vec<usize> = from_tree.iter().map(|r| r.index).collect();
        let f: Vec<usize> = from_flat.iter().map(|r| r.index).collect();
        assert_eq!(t, f);
    }

    #[test]
    fn test_results_sorted_and_in_range() {
        let c = normalized(500, 16, 4);
        let tree = SpatialTreeIndex::new(c.clone(), 16);
        let results = tree.query(c.get(3), 10).unwrap();

        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|r| r.index < 500));
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
