//! Work dispatcher - loads the URL universe and fans it out to workers
//!
//! The dispatcher subtracts the history log from the URL list, splits what
//! is left into at most one contiguous chunk per worker and runs one tokio
//! task per chunk. Partitions are fixed up front; workers never steal work
//! from each other.

use crate::crawler::worker::{CrawlWorker, WorkerContext, WorkerReport};
use crate::session::SessionFactory;
use crate::storage::HistoryStore;
use crate::SweepError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

/// Reads the URL list at `path`
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Trimmed, non-blank URLs in first-occurrence order
/// * `Err(SweepError::MissingUrlList)` - The file does not exist
pub fn load_url_list(path: &Path) -> Result<Vec<String>, SweepError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(parse_url_list(&content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(SweepError::MissingUrlList {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Parses one URL per line, dropping blanks and repeats
pub fn parse_url_list(content: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| seen.insert(line.to_string()))
        .map(str::to_string)
        .collect()
}

/// Splits `todo` into contiguous chunks of `ceil(len / workers)` URLs
///
/// Yields at most `workers` chunks and never an empty one; only the last
/// chunk may be shorter.
pub fn partition(todo: Vec<String>, workers: usize) -> Vec<Vec<String>> {
    if todo.is_empty() || workers == 0 {
        return Vec::new();
    }

    let size = (todo.len() + workers - 1) / workers;
    todo.chunks(size).map(<[String]>::to_vec).collect()
}

/// What a run will do, computed before any session is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPlan {
    /// Distinct URLs in the list
    pub universe: usize,
    /// URLs of the list already in the history log
    pub already_done: usize,
    pub partitions: Vec<Vec<String>>,
}

impl DispatchPlan {
    /// Subtracts `history` from `urls` and partitions the rest among `workers`
    pub fn build(
        urls: Vec<String>,
        history: &dyn HistoryStore,
        workers: usize,
    ) -> Result<Self, SweepError> {
        let done = history.load_all()?;
        let universe = urls.len();
        let todo: Vec<String> = urls.into_iter().filter(|url| !done.contains(url)).collect();
        let already_done = universe - todo.len();

        Ok(Self {
            universe,
            already_done,
            partitions: partition(todo, workers),
        })
    }

    /// URLs handed to workers
    pub fn scheduled(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}

/// Outcome of one dispatcher run
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub universe: usize,
    pub already_done: usize,
    pub scheduled: usize,
    /// One report per started worker, in worker id order
    pub workers: Vec<WorkerReport>,
}

impl DispatchReport {
    pub fn persisted_reviews(&self) -> usize {
        self.workers.iter().map(|w| w.persisted_reviews).sum()
    }

    pub fn recorded(&self) -> usize {
        self.workers.iter().map(|w| w.recorded).sum()
    }

    pub fn navigation_failures(&self) -> usize {
        self.workers.iter().map(|w| w.navigation_failures).sum()
    }

    pub fn degraded(&self) -> usize {
        self.workers.iter().map(|w| w.degraded).sum()
    }

    /// Workers that never processed their partition
    pub fn aborted_workers(&self) -> usize {
        self.workers.iter().filter(|w| w.aborted()).count()
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Runs a fixed pool of crawl workers over the unprocessed URLs
pub struct WorkDispatcher {
    workers: usize,
    context: WorkerContext,
    factory: Arc<dyn SessionFactory>,
}

impl WorkDispatcher {
    /// Creates a dispatcher for `workers` concurrent workers (at least one)
    pub fn new(workers: usize, context: WorkerContext, factory: Arc<dyn SessionFactory>) -> Self {
        Self {
            workers: workers.max(1),
            context,
            factory,
        }
    }

    /// Subtracts the history log from `urls` and partitions the rest
    pub fn plan(&self, urls: Vec<String>) -> Result<DispatchPlan, SweepError> {
        DispatchPlan::build(urls, self.context.history.as_ref(), self.workers)
    }

    /// Loads the URL list at `url_list` and processes every unrecorded URL
    ///
    /// A missing list fails before any worker starts.
    pub async fn run(&self, url_list: &Path) -> Result<DispatchReport, SweepError> {
        let urls = load_url_list(url_list)?;
        let plan = self.plan(urls)?;
        Ok(self.run_plan(plan).await)
    }

    /// Runs one worker per partition and waits for all of them
    pub async fn run_plan(&self, plan: DispatchPlan) -> DispatchReport {
        let started_at = Utc::now();
        let scheduled = plan.scheduled();

        tracing::info!(
            "{} URLs in list, {} already crawled, {} to crawl",
            plan.universe,
            plan.already_done,
            scheduled
        );

        if plan.is_empty() {
            tracing::info!("Nothing to crawl");
        }

        let handles: Vec<_> = plan
            .partitions
            .into_iter()
            .enumerate()
            .map(|(index, urls)| {
                let worker_id = index + 1;
                let assigned = urls.len();
                let factory = Arc::clone(&self.factory);
                let context = self.context.clone();
                tracing::debug!("Worker {} assigned {} URLs", worker_id, assigned);

                let handle =
                    tokio::spawn(async move { run_worker(worker_id, urls, factory, context).await });
                (worker_id, assigned, handle)
            })
            .collect();

        let mut workers = Vec::with_capacity(handles.len());
        for (worker_id, assigned, handle) in handles {
            let report = match handle.await {
                Ok(report) => report,
                Err(e) => {
                    let err = SweepError::WorkerJoin {
                        worker_id,
                        message: e.to_string(),
                    };
                    tracing::error!("{}", err);
                    WorkerReport::aborted_with(worker_id, assigned, err)
                }
            };
            workers.push(report);
        }

        let report = DispatchReport {
            started_at,
            finished_at: Utc::now(),
            universe: plan.universe,
            already_done: plan.already_done,
            scheduled,
            workers,
        };

        tracing::info!(
            "Sweep finished: {} reviews, {} URLs recorded, {} navigation failures in {}s",
            report.persisted_reviews(),
            report.recorded(),
            report.navigation_failures(),
            report.elapsed().num_seconds()
        );

        report
    }
}

/// Opens the worker's session and processes its partition
///
/// A session that cannot be opened ends this worker only.
async fn run_worker(
    worker_id: usize,
    urls: Vec<String>,
    factory: Arc<dyn SessionFactory>,
    context: WorkerContext,
) -> WorkerReport {
    let session = match factory.open(worker_id).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Worker {} could not open a session: {}", worker_id, e);
            return WorkerReport::aborted_with(worker_id, urls.len(), e);
        }
    };

    CrawlWorker::new(worker_id, session, context)
        .run(&urls)
        .await
}
