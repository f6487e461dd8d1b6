//! Review-Sweep: a resumable, partitioned review crawler
//!
//! This crate reads a list of listing-page URLs, skips the ones already
//! recorded in the history log, splits the rest among a fixed pool of
//! workers and writes every extracted review to a region-sharded JSONL
//! dataset.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod region;
pub mod review;
pub mod session;
pub mod state;
pub mod storage;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Review-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL list not found: {}", path.display())]
    MissingUrlList { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] session::SessionError),

    #[error("Worker {worker_id} stopped unexpectedly: {message}")]
    WorkerJoin { worker_id: usize, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid {name} selector: {message}")]
    InvalidSelector { name: String, message: String },
}

/// Result type alias for Review-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{sweep, DispatchReport, WorkDispatcher};
pub use region::{CrawlUnit, RegionClassifier};
pub use review::ReviewRecord;
pub use state::UnitState;
