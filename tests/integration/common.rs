//! Shared fixtures for the integration tests

use review_sweep::config::{Config, DelayRange, SelectorConfig};
use review_sweep::crawler::{Pacing, WorkDispatcher, WorkerContext, WorkerSettings};
use review_sweep::extract::SelectorExtractor;
use review_sweep::session::{ElementHandle, ScriptedPage, ScriptedSessionFactory};
use review_sweep::storage::{shard_file_name, FileHistoryStore, ShardedJsonlSink};
use review_sweep::{RegionClassifier, ReviewRecord};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Outer HTML of one review node as the listing pages render it
pub fn review_html(author: &str, text: &str, score: &str) -> String {
    format!(
        r#"<div class="review-item"><div class="ru-username">{}</div><div class="rd-des">{}</div><div class="review-points"><span>{}</span></div></div>"#,
        author, text, score
    )
}

/// A listing page with `count` reviews plus `blank` reviews without text
pub fn listing(count: usize, blank: usize) -> Vec<String> {
    let mut reviews: Vec<String> = (0..count)
        .map(|i| review_html("Lan", &format!("Mon an ngon so {}", i), "8,5"))
        .collect();
    reviews.extend((0..blank).map(|_| review_html("Minh", "", "7")));
    reviews
}

pub fn scripted_page(reviews: &[String]) -> ScriptedPage {
    ScriptedPage::infinite_scroll(
        reviews.iter().map(ElementHandle::new).collect(),
        2,
        2,
    )
}

/// A temporary working directory with the history log and dataset in it
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn history_path(&self) -> PathBuf {
        self.dir.path().join("history_crawled.txt")
    }

    pub fn dataset_dir(&self) -> PathBuf {
        self.dir.path().join("data_by_region")
    }

    pub fn url_list(&self) -> PathBuf {
        self.dir.path().join("list_links.txt")
    }

    pub fn write_url_list(&self, urls: &[String]) {
        std::fs::write(self.url_list(), urls.join("\n")).expect("Failed to write URL list");
    }

    /// A config that writes into this workspace and never waits
    pub fn config(&self, workers: u32) -> Config {
        let mut config = Config::default();
        config.crawler.workers = workers;
        config.crawler.settle_delay = DelayRange::zero();
        config.crawler.scroll_pause = DelayRange::zero();
        config.crawler.politeness_pause = DelayRange::zero();
        config.input.url_list = self.url_list().display().to_string();
        config.output.dataset_dir = self.dataset_dir().display().to_string();
        config.output.history_path = self.history_path().display().to_string();
        config
    }

    pub fn history(&self) -> Arc<FileHistoryStore> {
        Arc::new(FileHistoryStore::new(self.history_path()))
    }

    pub fn sink(&self) -> Arc<ShardedJsonlSink> {
        Arc::new(ShardedJsonlSink::new(self.dataset_dir()))
    }

    /// A dispatcher over scripted sessions sharing this workspace's stores
    pub fn dispatcher(&self, workers: usize, factory: ScriptedSessionFactory) -> WorkDispatcher {
        let context = WorkerContext {
            classifier: Arc::new(RegionClassifier::default()),
            extractor: Arc::new(
                SelectorExtractor::new(&SelectorConfig::default()).expect("default selectors"),
            ),
            history: self.history(),
            sink: self.sink(),
            settings: WorkerSettings {
                target_reviews: 50,
                max_scroll_attempts: 15,
                pacing: Pacing::none(),
            },
        };
        WorkDispatcher::new(workers, context, Arc::new(factory))
    }

    /// Raw lines of the history log, in file order
    pub fn history_lines(&self) -> Vec<String> {
        read_lines(&self.history_path())
    }

    /// Parsed records of one region shard, in file order
    pub fn shard(&self, region: &str) -> Vec<ReviewRecord> {
        read_lines(&self.dataset_dir().join(shard_file_name(region)))
            .iter()
            .map(|line| serde_json::from_str(line).expect("Shard line is not a review record"))
            .collect()
    }

    /// Every shard in the dataset directory, keyed by region
    pub fn shards(&self) -> HashMap<String, Vec<ReviewRecord>> {
        let Ok(entries) = std::fs::read_dir(self.dataset_dir()) else {
            return HashMap::new();
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                let region = name.strip_prefix("reviews_")?.strip_suffix(".jsonl")?;
                Some(region.to_string())
            })
            .map(|region| {
                let records = self.shard(&region);
                (region, records)
            })
            .collect()
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
