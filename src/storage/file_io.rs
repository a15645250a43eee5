//! JSON file helpers with atomic writes
//!
//! A data file is either the old version or the complete new version, never
//! a half-written mix.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::error::CashiroError;

/// Read JSON from a file, falling back to `T::default()` when it is missing
pub fn read_json<T, P>(path: P) -> Result<T, CashiroError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "data file missing, using defaults");
        return Ok(T::default());
    }
    read_json_required(path)
}

/// Read JSON from a file that must exist
pub fn read_json_required<T, P>(path: P) -> Result<T, CashiroError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| CashiroError::Storage(format!("Failed to open {}: {}", path.display(), e)))?;

    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| CashiroError::Storage(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Write pretty JSON through a sibling temp file, fsync, then rename over `path`
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), CashiroError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CashiroError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Same directory as the target so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| CashiroError::Storage(format!("Failed to create temp file: {}", e)))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| CashiroError::Storage(format!("Failed to serialize data: {}", e)))?;
    writer
        .flush()
        .map_err(|e| CashiroError::Storage(format!("Failed to flush data: {}", e)))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| CashiroError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        CashiroError::Storage(format!("Failed to replace {}: {}", path.display(), e))
    })?;

    debug!(path = %path.display(), "wrote data file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
    struct Sample {
        label: String,
        count: u32,
    }

    fn sample() -> Sample {
        Sample {
            label: "groceries".into(),
            count: 3,
        }
    }

    #[test]
    fn test_missing_file_reads_default() {
        let temp_dir = TempDir::new().unwrap();
        let loaded: Sample = read_json(temp_dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn test_write_then_read_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("sample.json");

        write_json_atomic(&path, &sample()).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("nested").join("sample.json.tmp").exists());
        let loaded: Sample = read_json(&path).unwrap();
        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_read_required_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("sample.json");
        assert!(read_json_required::<Sample, _>(&path).is_err());

        fs::write(&path, "not json").unwrap();
        let err = read_json_required::<Sample, _>(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
