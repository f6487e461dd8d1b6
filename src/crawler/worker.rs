//! Crawl worker
//!
//! A worker owns one page session and walks its partition one URL at a
//! time through the [`UnitState`] machine. Per-URL failures are absorbed
//! into the URL's [`UnitOutcome`]; the worker always moves on to the next URL.

use crate::config::CrawlerConfig;
use crate::crawler::converge::converge;
use crate::crawler::pacing::Pacing;
use crate::extract::{ExtractedFields, FieldExtractor};
use crate::region::RegionClassifier;
use crate::review::ReviewRecord;
use crate::session::PageSession;
use crate::state::UnitState;
use crate::storage::{HistoryStore, ReviewSink};
use crate::SweepError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Per-page limits and pacing shared by all workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSettings {
    /// Maximum reviews taken from one page
    pub target_reviews: usize,
    pub max_scroll_attempts: u32,
    pub pacing: Pacing,
}

impl WorkerSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            target_reviews: config.target_reviews as usize,
            max_scroll_attempts: config.max_scroll_attempts,
            pacing: Pacing::from_config(config),
        }
    }
}

/// Everything a worker shares with its siblings
///
/// The stores are shared handles; each serializes its own writers.
#[derive(Clone)]
pub struct WorkerContext {
    pub classifier: Arc<RegionClassifier>,
    pub extractor: Arc<dyn FieldExtractor>,
    pub history: Arc<dyn HistoryStore>,
    pub sink: Arc<dyn ReviewSink>,
    pub settings: WorkerSettings,
}

/// How one URL ended
#[derive(Debug, Clone, PartialEq)]
pub enum UnitOutcome {
    /// Reviews were written to the region's shard and the URL was recorded
    Persisted { region: String, count: usize },

    /// The page yielded no review with text; the URL was recorded
    Empty { region: String },

    /// The page could not be loaded; the URL stays eligible for a later run
    NavigationFailed { error: String },

    /// Processing failed after navigation; the URL was still recorded
    Degraded { stage: UnitState, error: String },

    /// The history log could not be written
    Unrecorded { error: String, persisted: usize },
}

impl UnitOutcome {
    /// Whether the URL made it into the history log
    pub fn is_recorded(&self) -> bool {
        matches!(
            self,
            Self::Persisted { .. } | Self::Empty { .. } | Self::Degraded { .. }
        )
    }

    /// Reviews written for this URL
    pub fn persisted(&self) -> usize {
        match self {
            Self::Persisted { count, .. } => *count,
            Self::Unrecorded { persisted, .. } => *persisted,
            _ => 0,
        }
    }
}

/// Summary of one worker's partition
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerReport {
    pub worker_id: usize,
    /// URLs in the partition
    pub assigned: usize,
    /// URLs that reached a terminal state
    pub processed: usize,
    pub recorded: usize,
    pub persisted_reviews: usize,
    pub empty: usize,
    pub navigation_failures: usize,
    pub degraded: usize,
    pub unrecorded: usize,
    /// Reviews written per region
    pub per_region: BTreeMap<String, usize>,
    /// Set when the worker could not open its session
    pub session_error: Option<String>,
}

impl WorkerReport {
    pub fn new(worker_id: usize, assigned: usize) -> Self {
        Self {
            worker_id,
            assigned,
            ..Self::default()
        }
    }

    /// Report for a worker that never got to process its partition
    pub fn aborted_with(worker_id: usize, assigned: usize, error: impl ToString) -> Self {
        Self {
            session_error: Some(error.to_string()),
            ..Self::new(worker_id, assigned)
        }
    }

    pub fn aborted(&self) -> bool {
        self.session_error.is_some()
    }

    /// Folds one URL outcome into the report
    pub fn record(&mut self, outcome: &UnitOutcome) {
        self.processed += 1;
        self.persisted_reviews += outcome.persisted();
        if outcome.is_recorded() {
            self.recorded += 1;
        }

        match outcome {
            UnitOutcome::Persisted { region, count } => {
                *self.per_region.entry(region.clone()).or_insert(0) += count;
            }
            UnitOutcome::Empty { .. } => self.empty += 1,
            UnitOutcome::NavigationFailed { .. } => self.navigation_failures += 1,
            UnitOutcome::Degraded { .. } => self.degraded += 1,
            UnitOutcome::Unrecorded { .. } => self.unrecorded += 1,
        }
    }
}

/// Result of walking one URL up to the Recording state
struct PagePersisted {
    region: String,
    count: usize,
}

/// Drives one page session through a partition
pub struct CrawlWorker {
    id: usize,
    session: Box<dyn PageSession>,
    ctx: WorkerContext,
}

impl CrawlWorker {
    pub fn new(id: usize, session: Box<dyn PageSession>, ctx: WorkerContext) -> Self {
        Self { id, session, ctx }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Processes every URL in order, then closes the session
    ///
    /// A politeness pause separates consecutive URLs, whatever the outcome
    /// of the previous one.
    pub async fn run(mut self, urls: &[String]) -> WorkerReport {
        let mut report = WorkerReport::new(self.id, urls.len());
        tracing::info!("Worker {} starting with {} URLs", self.id, urls.len());

        for (index, url) in urls.iter().enumerate() {
            if index > 0 {
                self.ctx.settings.pacing.politeness().await;
            }

            let outcome = self.process_unit(url).await;
            report.record(&outcome);

            tracing::info!(
                "Worker {}: {}/{} done, {} reviews so far",
                self.id,
                index + 1,
                urls.len(),
                report.persisted_reviews
            );
        }

        if let Err(e) = self.session.close().await {
            tracing::warn!("Worker {} failed to close its session: {}", self.id, e);
        }

        tracing::info!(
            "Worker {} finished: {} recorded, {} navigation failures, {} degraded",
            self.id,
            report.recorded,
            report.navigation_failures,
            report.degraded
        );

        report
    }

    /// Walks one URL through the state machine
    pub async fn process_unit(&mut self, url: &str) -> UnitOutcome {
        let mut state = UnitState::Navigating;
        tracing::debug!("Worker {}: {} -> {}", self.id, url, state);

        let page = match self.walk(url, &mut state).await {
            Ok(page) => page,
            Err(e) if !state.records_on_failure() => {
                tracing::warn!("Worker {}: failed to load {}: {}", self.id, url, e);
                tracing::debug!("Worker {}: {} -> {}", self.id, url, UnitState::Failed);
                return UnitOutcome::NavigationFailed {
                    error: e.to_string(),
                };
            }
            Err(e) => {
                tracing::warn!(
                    "Worker {}: {} failed while {}: {}",
                    self.id,
                    url,
                    state,
                    e
                );
                let outcome = UnitOutcome::Degraded {
                    stage: state,
                    error: e.to_string(),
                };
                return self.record(url, outcome, 0);
            }
        };

        let PagePersisted { region, count } = page;
        if count == 0 {
            tracing::info!("Worker {}: no reviews on {}", self.id, url);
            return self.record(url, UnitOutcome::Empty { region }, 0);
        }

        tracing::info!(
            "Worker {}: {} reviews from {} -> {}",
            self.id,
            count,
            url,
            region
        );
        self.record(url, UnitOutcome::Persisted { region, count }, count)
    }

    /// Runs Navigating through Persisting, leaving `state` at the failing stage
    async fn walk(
        &mut self,
        url: &str,
        state: &mut UnitState,
    ) -> Result<PagePersisted, SweepError> {
        let settings = self.ctx.settings;

        self.session.navigate(url).await?;
        settings.pacing.settle().await;
        self.advance(url, state);

        let converged = converge(
            self.session.as_mut(),
            settings.target_reviews,
            settings.max_scroll_attempts,
            &settings.pacing,
        )
        .await?;
        tracing::debug!(
            "Worker {}: {} converged after {} iterations ({:?}, {} visible)",
            self.id,
            url,
            converged.iterations,
            converged.reason,
            converged.visible
        );
        self.advance(url, state);

        let mut elements = self.session.find_review_elements().await?;
        elements.truncate(settings.target_reviews);
        let fields: Vec<ExtractedFields> = elements
            .iter()
            .map(|element| self.ctx.extractor.extract(element))
            .collect();
        let failed_fields: usize = fields.iter().map(ExtractedFields::failure_count).sum();
        if failed_fields > 0 {
            tracing::debug!(
                "Worker {}: {} fields on {} fell back to defaults",
                self.id,
                failed_fields,
                url
            );
        }
        self.advance(url, state);

        let unit = self.ctx.classifier.classify(url);
        let records: Vec<ReviewRecord> = fields
            .into_iter()
            .filter_map(|f| ReviewRecord::from_fields(&unit, f))
            .collect();
        self.advance(url, state);

        self.ctx.sink.append_batch(&unit.region, &records)?;

        Ok(PagePersisted {
            region: unit.region,
            count: records.len(),
        })
    }

    fn advance(&self, url: &str, state: &mut UnitState) {
        if let Some(next) = state.next() {
            tracing::debug!("Worker {}: {} -> {}", self.id, url, next);
            *state = next;
        }
    }

    /// Recording state: appends the URL to the history log
    fn record(&self, url: &str, outcome: UnitOutcome, persisted: usize) -> UnitOutcome {
        tracing::debug!("Worker {}: {} -> {}", self.id, url, UnitState::Recording);
        match self.ctx.history.mark_done(url) {
            Ok(()) => {
                let terminal = match outcome {
                    UnitOutcome::Degraded { .. } => UnitState::Failed,
                    _ => UnitState::Done,
                };
                tracing::debug!("Worker {}: {} -> {}", self.id, url, terminal);
                outcome
            }
            Err(e) => {
                tracing::error!("Worker {}: could not record {}: {}", self.id, url, e);
                UnitOutcome::Unrecorded {
                    error: e.to_string(),
                    persisted,
                }
            }
        }
    }
}
