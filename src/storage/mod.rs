//! Storage module for persisting crawl progress and reviews
//!
//! This module owns the two resources shared by all workers:
//! - the history log of URLs already attempted (resume state)
//! - the region-sharded review dataset
//!
//! Each resource sits behind its own lock. No code path holds both, and
//! there is no transaction spanning them: a crash after a batch is written
//! but before its URL is recorded makes the next run write that batch again.

mod history;
mod sink;
mod traits;

pub use history::FileHistoryStore;
pub use sink::{shard_file_name, ShardedJsonlSink};
pub use traits::{HistoryStore, ReviewSink, StorageError, StorageResult};

use crate::config::OutputConfig;

/// Opens the file-backed history log and review sink described by `config`
///
/// Nothing is created on disk until the first write.
pub fn open_storage(config: &OutputConfig) -> (FileHistoryStore, ShardedJsonlSink) {
    (
        FileHistoryStore::new(&config.history_path),
        ShardedJsonlSink::new(&config.dataset_dir),
    )
}
