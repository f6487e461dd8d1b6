//! Storage traits and error types
//!
//! This module defines the two shared resources the workers write to and
//! their error type. Both traits take `&self`: implementations serialize
//! writers internally, each behind exactly one lock.

use crate::review::ReviewRecord;
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),

    #[error("Invalid history entry: {0:?}")]
    InvalidEntry(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Append-only log of URLs already attempted
pub trait HistoryStore: Send + Sync {
    /// Loads every recorded URL; a missing log is an empty set
    ///
    /// The log is read as a set, so duplicate lines collapse.
    fn load_all(&self) -> StorageResult<HashSet<String>>;

    /// Appends one URL to the log
    ///
    /// The record is flushed to disk before the lock is released. Recording
    /// the same URL twice is allowed.
    fn mark_done(&self, url: &str) -> StorageResult<()>;
}

/// Append-only, region-sharded review dataset
pub trait ReviewSink: Send + Sync {
    /// Appends all records of one batch to the shard for `region`
    ///
    /// The lines of one batch are written contiguously; an empty batch is a
    /// no-op.
    fn append_batch(&self, region: &str, records: &[ReviewRecord]) -> StorageResult<()>;
}
