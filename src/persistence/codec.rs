//! Flat binary vector files.
//!
//! A file is `n * dim` native-endian `f32` values written back to back: no
//! header, no length prefix, no padding. The vector count and width travel
//! out of band, so the same layout serves raw embeddings and saved indexes.

use crate::error::{Result, VectorDbError};
use crate::vector::VectorCollection;
use memmap2::Mmap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Write every vector of `collection` to `path`.
///
/// Data goes to a sibling temporary file that is renamed over `path` once
/// fully written, so a failed save leaves no partial file behind.
pub fn save(path: impl AsRef<Path>, collection: &VectorCollection) -> Result<()> {
    let path = path.as_ref();
    let tmp = tmp_path(path);

    let file = File::create(&tmp).map_err(|source| VectorDbError::Open {
        path: tmp.clone(),
        source,
    })?;

    let written = write_all(file, collection.as_slice());
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn write_all(file: File, values: &[f32]) -> Result<()> {
    let mut out = BufWriter::new(file);
    for value in values {
        out.write_all(&value.to_ne_bytes())?;
    }
    let file = out.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read exactly `n` vectors of `dim` floats from `path`.
///
/// A file shorter than `n * dim * 4` bytes is an error; nothing is padded.
/// Bytes past that length are ignored.
pub fn load(path: impl AsRef<Path>, n: usize, dim: usize) -> Result<VectorCollection> {
    let path = path.as_ref();
    let expected = n
        .checked_mul(dim)
        .and_then(|count| count.checked_mul(F32_BYTES))
        .ok_or(VectorDbError::SizeOverflow { n, dim })?;

    let file = File::open(path).map_err(|source| VectorDbError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let actual = file.metadata()?.len();

    if actual < expected as u64 {
        return Err(VectorDbError::ShortRead {
            path: path.to_path_buf(),
            expected: expected as u64,
            actual,
        });
    }
    if actual > expected as u64 {
        tracing::warn!(
            path = %path.display(),
            expected,
            actual,
            "file is longer than the declared vector count, ignoring trailing bytes"
        );
    }

    let data = if expected == 0 {
        Vec::new()
    } else {
        read_floats(file, path, expected, actual)?
    };

    VectorCollection::from_flat(data, n, dim)
}

/// Decode the first `len` bytes of `file` as floats.
///
/// Memory-maps the file when possible and falls back to buffered reads.
/// `file_len` is the length reported by the file's metadata.
fn read_floats(file: File, path: &Path, len: usize, file_len: u64) -> Result<Vec<f32>> {
    match unsafe { Mmap::map(&file) } {
        Ok(mmap) if mmap.len() >= len => Ok(decode(&mmap[..len])),
        Ok(mmap) => Err(VectorDbError::ShortRead {
            path: path.to_path_buf(),
            expected: len as u64,
            actual: mmap.len() as u64,
        }),
        Err(e) => {
            tracing::debug!(error = %e, "mmap unavailable, using buffered read");
            read_buffered(BufReader::new(file), path, len, file_len)
        }
    }
}

fn read_buffered<R: Read>(
    mut reader: R,
    path: &Path,
    len: usize,
    file_len: u64,
) -> Result<Vec<f32>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => VectorDbError::ShortRead {
            path: path.to_path_buf(),
            expected: len as u64,
            actual: file_len,
        },
        _ => VectorDbError::IoError(e),
    })?;
    Ok(decode(&buf))
}

fn decode(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(F32_BYTES)
        .map(|b| f32::from_ne_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vectors.bin");

        let c = VectorCollection::from_rows(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]], 3)
            .unwrap();
        save(&path, &c).unwrap();

        assert_eq!(fs::metadata(&path).unwrap().len(), 2 * 3 * 4);
        let loaded = load(&path, 2, 3).unwrap();
        assert_eq!(loaded, c);
    }

    #[test]
    fn test_native_byte_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("vectors.bin");

        let c = VectorCollection::from_rows(&[vec![1.5, -2.25]], 2).unwrap();
        save(&path, &c).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&1.5f32.to_ne_bytes());
        expected.extend_from_slice(&(-2.25f32).to_ne_bytes());
        assert_eq!(fs::read(&path).unwrap(), expected);
    }

    #[test]
    fn test_no_tmp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("index.bin");
        save(&path, &VectorCollection::random(4, 2, 1)).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("index.bin")]);
    }

    #[test]
    fn test_short_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.bin");
        fs::write(&path, vec![0u8; 4 * 5]).unwrap();

        let result = load(&path, 2, 3);
        assert!(matches!(
            result,
            Err(VectorDbError::ShortRead {
                expected: 24,
                actual: 20,
                ..
            })
        ));
    }

    #[test]
    fn test_buffered_short_read_reports_file_length() {
        let bytes = vec![0u8; 10];
        let result = read_buffered(&bytes[..], Path::new("short.bin"), 16, 10);
        assert!(matches!(
            result,
            Err(VectorDbError::ShortRead {
                expected: 16,
                actual: 10,
                ..
            })
        ));
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let dir = TempDir::new().unwrap();
        let result = load(dir.path().join("missing.bin"), 1, 1);
        assert!(matches!(result, Err(VectorDbError::Open { .. })));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("long.bin");
        let mut bytes = Vec::new();
        for v in [1.0f32, 2.0, 3.0] {
            bytes.extend_from_slice(&v.to_ne_bytes());
        }
        fs::write(&path, bytes).unwrap();

        let loaded = load(&path, 1, 2).unwrap();
        assert_eq!(loaded.as_slice(), &[1.0, 2.0]);
    }

    #[test]
    fn test_empty_collection() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.bin");
        save(&path, &VectorCollection::random(0, 8, 0)).unwrap();

        let loaded = load(&path, 0, 8).unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.dim(), 8);
    }

    #[test]
    fn test_save_to_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no_such_dir").join("index.bin");
        let result = save(&path, &VectorCollection::random(1, 1, 0));
        assert!(matches!(result, Err(VectorDbError::Open { .. })));
    }
}
