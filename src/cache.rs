//! Flat little-endian binary caches (`lat.bin`, `conc.bin`, `areas.bin`, ...).

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} holds {found} bytes, which is not a whole number of {size}-byte values")]
    Truncated {
        path: PathBuf,
        found: usize,
        size: usize,
    },
    #[error("{path} holds {found} values, expected {expected}")]
    Length {
        path: PathBuf,
        expected: usize,
        found: usize,
    },
}

/// Values that can be stored in a flat binary cache.
pub trait CacheValue: Copy {
    const SIZE: usize;
    fn to_le(self, out: &mut Vec<u8>);
    fn from_le(bytes: &[u8]) -> Self;
}

impl CacheValue for f32 {
    const SIZE: usize = 4;

    fn to_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn from_le(bytes: &[u8]) -> Self {
        f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl CacheValue for i16 {
    const SIZE: usize = 2;

    fn to_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn from_le(bytes: &[u8]) -> Self {
        i16::from_le_bytes([bytes[0], bytes[1]])
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CacheError + '_ {
    move |source| CacheError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub fn write_values<T: CacheValue>(path: &Path, values: &[T]) -> Result<(), CacheError> {
    let mut bytes = Vec::with_capacity(values.len() * T::SIZE);
    for &value in values {
        value.to_le(&mut bytes);
    }

    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes).map_err(io_error(path))?;
    writer.flush().map_err(io_error(path))?;

    Ok(())
}

pub fn read_values<T: CacheValue>(path: &Path) -> Result<Vec<T>, CacheError> {
    let file = File::open(path).map_err(io_error(path))?;
    let mut reader = BufReader::new(file);
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(io_error(path))?;

    if bytes.len() % T::SIZE != 0 {
        return Err(CacheError::Truncated {
            path: path.to_path_buf(),
            found: bytes.len(),
            size: T::SIZE,
        });
    }

    Ok(bytes.chunks_exact(T::SIZE).map(T::from_le).collect())
}

/// Reads a cache and checks it holds exactly `expected` values.
pub fn read_values_exact<T: CacheValue>(
    path: &Path,
    expected: usize,
) -> Result<Vec<T>, CacheError> {
    let values = read_values(path)?;
    if values.len() != expected {
        return Err(CacheError::Length {
            path: path.to_path_buf(),
            expected,
            found: values.len(),
        });
    }

    Ok(values)
}

/// Loads a cache if it has already been made.
pub fn load_if_present<T: CacheValue>(path: &Path) -> Result<Option<Vec<T>>, CacheError> {
    if !path.exists() {
        return Ok(None);
    }

    info!("Loading \"{}\" ...", path.display());
    read_values(path).map(Some)
}

pub fn ensure_dir(path: &Path) -> Result<(), CacheError> {
    fs::create_dir_all(path).map_err(io_error(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_f32_cache_is_little_endian() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lat.bin");

        write_values(&path, &[1.0f32, -2.5, 65.875]).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());

        let values: Vec<f32> = read_values(&path).unwrap();
        assert_eq!(values, vec![1.0, -2.5, 65.875]);
    }

    #[test]
    fn test_i16_cache_keeps_sentinels() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conc.bin");

        write_values(&path, &[-99i16, -59, 0, 100]).unwrap();

        let values: Vec<i16> = read_values_exact(&path, 4).unwrap();
        assert_eq!(values, vec![-99, -59, 0, 100]);
    }

    #[test]
    fn test_length_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("areas.bin");

        write_values(&path, &[1.0f32, 2.0]).unwrap();

        let result: Result<Vec<f32>, _> = read_values_exact(&path, 3);
        assert!(matches!(
            result,
            Err(CacheError::Length {
                expected: 3,
                found: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_truncated_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.bin");
        std::fs::write(&path, [0u8, 1, 2]).unwrap();

        let result: Result<Vec<f32>, _> = read_values(&path);
        assert!(matches!(result, Err(CacheError::Truncated { found: 3, .. })));
    }

    #[test]
    fn test_load_if_present() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lon.bin");

        let missing: Option<Vec<f32>> = load_if_present(&path).unwrap();
        assert!(missing.is_none());

        write_values(&path, &[9.0f32]).unwrap();
        let present: Option<Vec<f32>> = load_if_present(&path).unwrap();
        assert_eq!(present, Some(vec![9.0]));
    }
}
