//! Randomized waits between page actions
//!
//! All waits are local to the worker that takes them.

use crate::config::{CrawlerConfig, DelayRange};
use rand::Rng;
use std::time::Duration;

/// The three pauses a worker takes while handling its partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After navigation, before the first scroll
    pub settle: DelayRange,
    /// Between scroll iterations
    pub scroll: DelayRange,
    /// Between two URLs
    pub politeness: DelayRange,
}

impl Pacing {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            settle: config.settle_delay,
            scroll: config.scroll_pause,
            politeness: config.politeness_pause,
        }
    }

    /// Pacing that never waits
    pub fn none() -> Self {
        Self {
            settle: DelayRange::zero(),
            scroll: DelayRange::zero(),
            politeness: DelayRange::zero(),
        }
    }

    pub async fn settle(&self) {
        pause(self.settle).await;
    }

    pub async fn scroll(&self) {
        pause(self.scroll).await;
    }

    pub async fn politeness(&self) {
        pause(self.politeness).await;
    }
}

/// Draws a duration uniformly from the range
pub fn jitter(range: DelayRange) -> Duration {
    if range.max_ms <= range.min_ms {
        return Duration::from_millis(range.min_ms);
    }
    Duration::from_millis(rand::thread_rng().gen_range(range.min_ms..=range.max_ms))
}

async fn pause(range: DelayRange) {
    let wait = jitter(range);
    if !wait.is_zero() {
        tokio::time::sleep(wait).await;
    }
}
