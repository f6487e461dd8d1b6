//! Output module for inspecting the review dataset
//!
//! This module handles:
//! - Counting history entries and shard lines
//! - Printing dataset statistics for the `--stats` mode

pub mod stats;

pub use stats::{load_statistics, print_statistics, DatasetStatistics, ShardStatistics};
