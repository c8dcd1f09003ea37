//! Candidate store: a JSON array of finished records on disk.
//!
//! Appends read the whole file, push, and rewrite it. Writers are serialized
//! through one mutex and the rewrite goes through a temp file + rename, so a
//! crash mid-write never leaves a truncated store behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::info;

use crate::intake::record::CandidateRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is not a valid record list: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize records: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub struct CandidateStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CandidateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record. Returns the number of records now stored.
    pub async fn append(&self, record: &CandidateRecord) -> Result<usize, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        let record = record.clone();

        let count = tokio::task::spawn_blocking(move || -> Result<usize, StoreError> {
            let mut records = read_records(&path)?;
            records.push(record);
            write_records(&path, &records)?;
            Ok(records.len())
        })
        .await??;

        info!("Candidate record appended to {} ({count} total)", self.path.display());
        Ok(count)
    }

    /// Every stored record, oldest first. A missing file is an empty store.
    pub async fn load_all(&self) -> Result<Vec<CandidateRecord>, StoreError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_records(&path)).await?
    }
}

fn read_records(path: &Path) -> Result<Vec<CandidateRecord>, StoreError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StoreError::io(path, e)),
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn write_records(path: &Path, records: &[CandidateRecord]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

    let body = serde_json::to_vec_pretty(records)?;
    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
    tmp.write_all(&body).map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.flush().map_err(|e| StoreError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| StoreError::io(path, e.error))?;
    Ok(())
}
