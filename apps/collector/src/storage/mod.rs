//! File persistence for collected results.
//!
//! Every run appends to a CSV log, merges into a date-partitioned JSON array
//! and replaces a summary document. Nothing is ever removed from the first
//! two.

mod csv;
mod daily;
mod summary;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

pub use csv::{CsvLog, CsvRecord};
pub use daily::DailyLog;
pub use summary::write_summary;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error on {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("invalid json in {}: {source}", path.display())]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("{} does not contain a JSON array, refusing to overwrite it", path.display())]
    Corrupt { path: PathBuf },
}

impl StorageError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Io { path: path.to_path_buf(), source }
    }

    pub(crate) fn json(path: &Path) -> impl FnOnce(serde_json::Error) -> Self + '_ {
        move |source| Self::Json { path: path.to_path_buf(), source }
    }
}

/// Where one collector keeps its files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    pub csv: PathBuf,
    pub daily_dir: PathBuf,
    pub summary: PathBuf,
}

impl DataLayout {
    /// `logs.csv`, `logs/<date>.json` and `summary.json` under `data_dir`
    pub fn probe(data_dir: &Path) -> Self {
        Self {
            csv: data_dir.join("logs.csv"),
            daily_dir: data_dir.join("logs"),
            summary: data_dir.join("summary.json"),
        }
    }

    /// Everything under `data_dir/uptimerobot`
    pub fn sync(data_dir: &Path) -> Self {
        let root = data_dir.join("uptimerobot");
        Self {
            csv: root.join("monitors.csv"),
            summary: root.join("summary.json"),
            daily_dir: root,
        }
    }
}

pub(crate) fn ensure_parent(path: &Path) -> Result<&Path, StorageError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(StorageError::io(parent))?;
    Ok(parent)
}

/// Replace `path` with `bytes` through a temp file in the same directory
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let parent = ensure_parent(path)?;

    let mut file = NamedTempFile::new_in(parent).map_err(StorageError::io(parent))?;
    file.write_all(bytes).map_err(StorageError::io(path))?;
    file.as_file().sync_all().map_err(StorageError::io(path))?;
    file.persist(path).map_err(|e| StorageError::Io { path: path.to_path_buf(), source: e.error })?;
    Ok(())
}
