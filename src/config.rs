//! Index configuration: strategy selection and construction parameters.

use crate::error::{Result, VectorDbError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which search strategy answers queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IndexKind {
    /// Exact brute-force scan
    #[default]
    Flat,
    /// Median-split spatial partitioning tree
    Tree,
    /// Random-hyperplane locality-sensitive hashing
    Hash,
}

impl IndexKind {
    pub fn name(&self) -> &'static str {
        match self {
            IndexKind::Flat => "flat",
            IndexKind::Tree => "tree",
            IndexKind::Hash => "hash",
        }
    }
}

/// Parameters shared by the build and search phases.
///
/// Every field falls back to its default when missing from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Strategy used to answer queries.
    pub index: IndexKind,
    /// Number of components per embedding.
    pub dimension: usize,
    /// Maximum number of points held by a tree leaf.
    pub leaf_capacity: usize,
    /// Number of independent hash tables (M).
    pub num_tables: usize,
    /// Hyperplanes per table, i.e. bits per bucket key (L).
    pub num_bits: usize,
    /// Seed for hyperplane generation.
    pub seed: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            index: IndexKind::Flat,
            dimension: 128,
            leaf_capacity: 32,
            num_tables: 8,
            num_bits: 8,
            seed: 42,
        }
    }
}

impl IndexConfig {
    pub fn new(index: IndexKind, dimension: usize) -> Self {
        Self {
            index,
            dimension,
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            VectorDbError::ConfigError(format!("cannot read {}: {}", path.display(), e))
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            VectorDbError::ConfigError(format!("invalid JSON in {}: {}", path.display(), e))
        })
    }

    /// Reject parameter combinations no strategy can be built with.
    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(VectorDbError::InvalidConfig(
                "dimension must be at least 1".to_string(),
            ));
        }
        if self.leaf_capacity == 0 {
            return Err(VectorDbError::InvalidConfig(
                "leaf_capacity must be at least 1".to_string(),
            ));
        }
        if self.num_tables == 0 {
            return Err(VectorDbError::InvalidConfig(
                "num_tables must be at least 1".to_string(),
            ));
        }
        if self.num_bits == 0 || self.num_bits > 64 {
            return Err(VectorDbError::InvalidConfig(format!(
                "num_bits must be between 1 and 64, got {}",
                self.num_bits
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = IndexConfig::default();
        assert_eq!(config.dimension, 128);
        assert_eq!(config.leaf_capacity, 32);
        assert_eq!(config.index, IndexKind::Flat);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "index": "hash", "num_bits": 12 }"#).unwrap();

        let config = IndexConfig::from_json_file(&path).unwrap();
        assert_eq!(config.index, IndexKind::Hash);
        assert_eq!(config.num_bits, 12);
        assert_eq!(config.dimension, 128);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let result = IndexConfig::from_json_file(&path);
        assert!(matches!(result, Err(VectorDbError::ConfigError(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = IndexConfig::from_json_file("/nonexistent/config.json");
        assert!(matches!(result, Err(VectorDbError::ConfigError(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = IndexConfig::new(IndexKind::Tree, 0);
        assert!(matches!(config.validate(), Err(VectorDbError::InvalidConfig(_))));

        config.dimension = 4;
        config.num_bits = 65;
        assert!(config.validate().is_err());

        config.num_bits = 64;
        config.leaf_capacity = 0;
        assert!(config.validate().is_err());
    }
}
