//! Build and search pipelines tying the codec, normalization, index and server together.

use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use crate::config::IndexConfig;
use crate::error::Result;
use crate::index::{build_index, IndexStrategy};
use crate::persistence::codec;
use crate::server::QueryServer;
use crate::vector::VectorCollection;

/// Load `n` vectors from `path` and normalize them in place.
pub fn load_normalized(
    path: impl AsRef<Path>,
    n: usize,
    config: &IndexConfig,
) -> Result<VectorCollection> {
    let path = path.as_ref();
    tracing::info!(path = %path.display(), n, dim = config.dimension, "loading vectors");
    let mut collection = codec::load(path, n, config.dimension)?;

    let start = Instant::now();
    collection.normalize();
    tracing::info!(elapsed_ms = start.elapsed().as_millis() as u64, "vectors normalized");
    Ok(collection)
}

/// Construct the configured strategy over an already normalized collection.
pub fn build_strategy(
    collection: Arc<VectorCollection>,
    config: &IndexConfig,
) -> Result<Box<dyn IndexStrategy>> {
    let start = Instant::now();
    let index = build_index(collection, config)?;
    tracing::info!(
        index = config.index.name(),
        vectors = index.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "index built"
    );
    Ok(index)
}

/// Build phase: load raw vectors, normalize, check the index builds, save.
///
/// The derived structure is discarded; only normalized vectors reach `output`.
pub fn build(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    n: usize,
    config: &IndexConfig,
) -> Result<()> {
    config.validate()?;
    let collection = Arc::new(load_normalized(input, n, config)?);
    build_strategy(collection.clone(), config)?;

    let output = output.as_ref();
    tracing::info!(path = %output.display(), "saving index");
    codec::save(output, &collection)?;
    tracing::info!("index built and saved");
    Ok(())
}

/// Load a saved index and rebuild the configured strategy over it.
pub fn open_index(
    path: impl AsRef<Path>,
    n: usize,
    config: &IndexConfig,
) -> Result<Box<dyn IndexStrategy>> {
    config.validate()?;
    let collection = load_normalized(path, n, config)?;
    build_strategy(Arc::new(collection), config)
}

/// Search phase: open the index and serve `input` until it closes.
pub fn search<R: BufRead, W: Write>(
    path: impl AsRef<Path>,
    n: usize,
    config: &IndexConfig,
    input: R,
    output: W,
) -> Result<()> {
    let index = open_index(path, n, config)?;
    tracing::info!("index loaded, ready to receive queries");
    QueryServer::new(index.as_ref()).serve(input, output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IndexKind;
    use crate::distance;
    use crate::error::VectorDbError;
    use approx::assert_relative_eq;
    use std::io::Cursor;
    use tempfile::TempDir;

    #[test]
    fn test_build_saves_normalized_vectors() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("raw.bin");
        let output = dir.path().join("index.bin");
        codec::save(&input, &VectorCollection::random(50, 8, 42)).unwrap();

        let config = IndexConfig::new(IndexKind::Tree, 8);
        build(&input, &output, 50, &config).unwrap();

        let saved = codec::load(&output, 50, 8).unwrap();
        for row in saved.iter() {
            assert_relative_eq!(distance::norm(row), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_build_short_input_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("raw.bin");
        let output = dir.path().join("index.bin");
        codec::save(&input, &VectorCollection::random(5, 8, 42)).unwrap();

        let result = build(&input, &output, 6, &IndexConfig::new(IndexKind::Flat, 8));
        assert!(matches!(result, Err(VectorDbError::ShortRead { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn test_search_pipeline() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.bin");
        let c = VectorCollection::from_rows(&[vec![3.0, 4.0], vec![0.0, 5.0], vec![1.0, 0.0]], 2)
            .unwrap();
        codec::save(&path, &c).unwrap();

        let mut out = Vec::new();
        let config = IndexConfig::new(IndexKind::Flat, 2);
        search(&path, 3, &config, Cursor::new("2,0.6,0.8\n"), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("0,"));
        assert!(lines[1].starts_with("1,"));
    }
}
