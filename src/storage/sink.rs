//! Region-sharded JSONL review sink
//!
//! Every region has one shard, `<dataset-dir>/reviews_<region>.jsonl`. A
//! single mutex covers all shards, so each batch lands as one contiguous
//! run of lines.

use crate::review::ReviewRecord;
use crate::storage::traits::{ReviewSink, StorageError, StorageResult};
use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Shard file name for a region
pub fn shard_file_name(region: &str) -> String {
    format!("reviews_{}.jsonl", region)
}

/// Writes review batches into per-region JSONL files
#[derive(Debug)]
pub struct ShardedJsonlSink {
    dataset_dir: PathBuf,
    /// Lines written per region through this handle
    written: Mutex<HashMap<String, u64>>,
}

impl ShardedJsonlSink {
    pub fn new(dataset_dir: impl Into<PathBuf>) -> Self {
        Self {
            dataset_dir: dataset_dir.into(),
            written: Mutex::new(HashMap::new()),
        }
    }

    pub fn dataset_dir(&self) -> &Path {
        &self.dataset_dir
    }

    /// Path of the shard holding `region`'s reviews
    pub fn shard_path(&self, region: &str) -> PathBuf {
        self.dataset_dir.join(shard_file_name(region))
    }

    /// Lines written per region through this handle
    pub fn written(&self) -> StorageResult<HashMap<String, u64>> {
        let guard = self
            .written
            .lock()
            .map_err(|_| StorageError::LockPoisoned("review sink"))?;
        Ok(guard.clone())
    }
}

impl ReviewSink for ShardedJsonlSink {
    fn append_batch(&self, region: &str, records: &[ReviewRecord]) -> StorageResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        // Serialize before taking the lock
        let mut buffer = String::new();
        for record in records {
            buffer.push_str(&record.to_json_line()?);
            buffer.push('\n');
        }

        let mut written = self
            .written
            .lock()
            .map_err(|_| StorageError::LockPoisoned("review sink"))?;

        fs::create_dir_all(&self.dataset_dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.shard_path(region))?;
        file.write_all(buffer.as_bytes())?;
        file.flush()?;

        *written.entry(region.to_string()).or_insert(0) += records.len() as u64;
        Ok(())
    }
}
