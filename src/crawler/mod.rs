//! Crawler module for partitioned review crawling
//!
//! This module contains the core crawling logic, including:
//! - Randomized pacing between page actions
//! - Scroll convergence on infinite-scroll listings
//! - The per-URL worker state machine
//! - Static partitioning and the worker pool

mod converge;
mod dispatcher;
mod pacing;
mod worker;

pub use converge::{converge, ConvergeOutcome, ConvergeReason};
pub use dispatcher::{
    load_url_list, parse_url_list, partition, DispatchPlan, DispatchReport, WorkDispatcher,
};
pub use pacing::{jitter, Pacing};
pub use worker::{CrawlWorker, UnitOutcome, WorkerContext, WorkerReport, WorkerSettings};

use crate::config::Config;
use crate::extract::SelectorExtractor;
use crate::region::RegionClassifier;
use crate::session::HttpSessionFactory;
use crate::storage::open_storage;
use crate::SweepError;
use std::path::Path;
use std::sync::Arc;

/// Builds the shared worker context for `config`
///
/// Uses the file-backed history log and review sink and the selector-based
/// field extractor.
pub fn build_context(config: &Config) -> Result<WorkerContext, SweepError> {
    let (history, sink) = open_storage(&config.output);

    Ok(WorkerContext {
        classifier: Arc::new(RegionClassifier::from_config(config)),
        extractor: Arc::new(SelectorExtractor::new(&config.selectors)?),
        history: Arc::new(history),
        sink: Arc::new(sink),
        settings: WorkerSettings::from_config(&config.crawler),
    })
}

/// Runs a complete sweep over the URL list at `url_list`
///
/// This is the main entry point for a crawl. It will:
/// 1. Open the history log and review dataset
/// 2. Load the URL list and skip URLs already recorded
/// 3. Partition the rest among `config.crawler.workers` workers
/// 4. Crawl every partition over HTTP sessions
///
/// # Returns
///
/// * `Ok(DispatchReport)` - Every worker finished
/// * `Err(SweepError)` - The run could not start
pub async fn sweep(config: &Config, url_list: &Path) -> Result<DispatchReport, SweepError> {
    let context = build_context(config)?;
    let factory = Arc::new(HttpSessionFactory::new(config));
    let dispatcher = WorkDispatcher::new(config.crawler.workers as usize, context, factory);

    dispatcher.run(url_list).await
}
