//! Statistics gathered from the history log and the review dataset
//!
//! This module provides functionality for reading back what previous runs
//! wrote and displaying it. Shards are read line by line, the same way
//! downstream consumers read them: every line stands on its own.

use crate::config::Config;
use crate::review::ReviewRecord;
use crate::storage::{FileHistoryStore, HistoryStore};
use crate::SweepError;
use std::fs;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

/// Line counts for one region shard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardStatistics {
    pub region: String,
    pub path: PathBuf,

    /// Lines that parse as a review with text
    pub valid: u64,

    /// Lines that are not a review record (e.g. torn by a crash)
    pub invalid: u64,

    /// Records whose text is empty
    pub empty_text: u64,
}

/// Dataset statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetStatistics {
    /// Distinct URLs in the history log
    pub history_entries: u64,

    /// One entry per shard file, sorted by region
    pub shards: Vec<ShardStatistics>,
}

impl DatasetStatistics {
    pub fn total_reviews(&self) -> u64 {
        self.shards.iter().map(|s| s.valid).sum()
    }

    pub fn total_invalid(&self) -> u64 {
        self.shards.iter().map(|s| s.invalid + s.empty_text).sum()
    }
}

/// Loads statistics for the history log and dataset named in `config`
///
/// A missing history log or dataset directory counts as empty.
///
/// # Returns
///
/// * `Ok(DatasetStatistics)` - Successfully loaded statistics
/// * `Err(SweepError)` - A file exists but could not be read
pub fn load_statistics(config: &Config) -> Result<DatasetStatistics, SweepError> {
    let history = FileHistoryStore::new(&config.output.history_path);
    let history_entries = history.load_all()?.len() as u64;

    let dataset_dir = Path::new(&config.output.dataset_dir);
    let entries = match fs::read_dir(dataset_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Ok(DatasetStatistics {
                history_entries,
                shards: Vec::new(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    let mut shards = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if let Some(region) = shard_region(&path) {
            shards.push(load_shard(&region, &path)?);
        }
    }
    shards.sort_by(|a, b| a.region.cmp(&b.region));

    Ok(DatasetStatistics {
        history_entries,
        shards,
    })
}

/// Region of a `reviews_<region>.jsonl` path, None for any other file
fn shard_region(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let region = name.strip_prefix("reviews_")?.strip_suffix(".jsonl")?;
    if region.is_empty() {
        None
    } else {
        Some(region.to_string())
    }
}

/// Counts the lines of one shard file
///
/// Lines are split on raw bytes so a line torn inside a multi-byte
/// character counts as invalid instead of failing the whole shard.
fn load_shard(region: &str, path: &Path) -> Result<ShardStatistics, SweepError> {
    let reader = BufReader::new(fs::File::open(path)?);
    let mut stats = ShardStatistics {
        region: region.to_string(),
        path: path.to_path_buf(),
        valid: 0,
        invalid: 0,
        empty_text: 0,
    };

    for line in reader.split(b'\n') {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match serde_json::from_slice::<ReviewRecord>(&line) {
            Ok(record) if record.text.trim().is_empty() => stats.empty_text += 1,
            Ok(_) => stats.valid += 1,
            Err(_) => stats.invalid += 1,
        }
    }

    Ok(stats)
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &DatasetStatistics) {
    println!("=== Dataset Statistics ===\n");

    println!("Overview:");
    println!("  URLs crawled: {}", stats.history_entries);
    println!("  Reviews stored: {}", stats.total_reviews());
    println!("  Shards: {}", stats.shards.len());
    println!();

    if stats.shards.is_empty() {
        println!("No review shards found");
        return;
    }

    println!("Reviews by Region:");
    let total = stats.total_reviews();
    for shard in &stats.shards {
        let percentage = if total > 0 {
            (shard.valid as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", shard.region, shard.valid, percentage);
    }
    println!();

    if stats.total_invalid() > 0 {
        println!("Unusable Lines:");
        for shard in stats.shards.iter().filter(|s| s.invalid + s.empty_text > 0) {
            println!(
                "  {}: {} malformed, {} without text",
                shard.region, shard.invalid, shard.empty_text
            );
        }
        println!();
    }
}
