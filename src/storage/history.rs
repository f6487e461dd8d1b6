//! File-backed history log
//!
//! One URL per line, newline-terminated, appended under a single mutex.

use crate::storage::traits::{HistoryStore, StorageError, StorageResult};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// History log stored in a plain text file
#[derive(Debug)]
pub struct FileHistoryStore {
    path: PathBuf,
    /// Entries appended through this handle
    appended: Mutex<u64>,
}

impl FileHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            appended: Mutex::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries appended through this handle
    pub fn appended(&self) -> StorageResult<u64> {
        let guard = self
            .appended
            .lock()
            .map_err(|_| StorageError::LockPoisoned("history"))?;
        Ok(*guard)
    }

    /// Removes the log, resetting all progress
    ///
    /// Returns false when there was no log to remove.
    pub fn reset(&self) -> StorageResult<bool> {
        let _guard = self
            .appended
            .lock()
            .map_err(|_| StorageError::LockPoisoned("history"))?;

        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl HistoryStore for FileHistoryStore {
    fn load_all(&self) -> StorageResult<HashSet<String>> {
        let _guard = self
            .appended
            .lock()
            .map_err(|_| StorageError::LockPoisoned("history"))?;

        // Bytes, not a string: a torn last line may end mid-character
        let content = match fs::read(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashSet::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .split(|&b| b == b'\n')
            .map(String::from_utf8_lossy)
            .map(|line| line.trim().to_string())
            .filter(|line| !line.is_empty())
            .collect())
    }

    fn mark_done(&self, url: &str) -> StorageResult<()> {
        let url = url.trim();
        if url.is_empty() || url.contains(['\n', '\r']) {
            return Err(StorageError::InvalidEntry(url.to_string()));
        }

        let mut appended = self
            .appended
            .lock()
            .map_err(|_| StorageError::LockPoisoned("history"))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format!("{}\n", url).as_bytes())?;
        file.flush()?;
        file.sync_data()?;

        *appended += 1;
        Ok(())
    }
}
