//! # vecsearch
//!
//! Top-k cosine similarity search over fixed-dimension `f32` embeddings.
//!
//! This library provides:
//! - A flat binary vector file format (native-endian `f32`, no header)
//! - L2 normalization and dot-product scoring
//! - Three search strategies: exact flat scan, median-split spatial tree,
//!   and random-hyperplane LSH
//! - A line-oriented query server
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use vecsearch::{build_index, IndexConfig, IndexKind, IndexStrategy, VectorCollection};
//!
//! let mut vectors =
//!     VectorCollection::from_rows(&[vec![3.0, 4.0], vec![0.0, 5.0], vec![1.0, 0.0]], 2)
//!         .unwrap();
//! vectors.normalize();
//!
//! let index = build_index(Arc::new(vectors), &IndexConfig::new(IndexKind::Flat, 2)).unwrap();
//! let results = index.query(&[0.6, 0.8], 2).unwrap();
//! assert_eq!(results[0].index, 0);
//! assert_eq!(results[1].index, 1);
//! ```

pub mod config;
pub mod distance;
pub mod engine;
pub mod error;
pub mod flat_index;
pub mod hash_index;
pub mod index;
pub mod metrics;
pub mod persistence;
pub mod server;
pub mod spatial_tree;
pub mod top_k;
pub mod vector;

pub use config::{IndexConfig, IndexKind};
pub use error::{Result, VectorDbError};
pub use flat_index::FlatIndex;
pub use hash_index::HashIndex;
pub use index::{build_index, IndexStrategy};
pub use server::QueryServer;
pub use spatial_tree::SpatialTreeIndex;
pub use top_k::{select_top_k, SearchResult, TopK};
pub use vector::VectorCollection;
