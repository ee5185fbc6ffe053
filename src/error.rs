//! Error types for the search engine

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for vecsearch operations
pub type Result<T> = std::result::Result<T, VectorDbError>;

/// Error types that can occur while loading, building or querying an index
#[derive(Error, Debug)]
pub enum VectorDbError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Short read from {path}: expected {expected} bytes, got {actual}")]
    ShortRead {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    #[error("Collection of {n} vectors x {dim} dimensions is too large to address")]
    SizeOverflow { n: usize, dim: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Item {index} is out of range for {len} vectors")]
    ItemOutOfRange { index: usize, len: usize },

    #[error("Malformed query: {reason}")]
    MalformedQuery { reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl VectorDbError {
    /// Whether this error came from reading or writing a vector file.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            VectorDbError::Open { .. }
                | VectorDbError::ShortRead { .. }
                | VectorDbError::SizeOverflow { .. }
                | VectorDbError::IoError(_)
        )
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        VectorDbError::MalformedQuery {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_classification() {
        let short = VectorDbError::ShortRead {
            path: PathBuf::from("x.bin"),
            expected: 8,
            actual: 4,
        };
        assert!(short.is_storage());
        assert!(!VectorDbError::malformed("bad").is_storage());
        assert!(!VectorDbError::InvalidConfig("dimension".into()).is_storage());
    }

    #[test]
    fn test_short_read_message() {
        let err = VectorDbError::ShortRead {
            path: PathBuf::from("index.bin"),
            expected: 1024,
            actual: 512,
        };
        assert_eq!(
            err.to_string(),
            "Short read from index.bin: expected 1024 bytes, got 512"
        );
    }
}
