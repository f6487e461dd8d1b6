//! Scroll convergence
//!
//! Infinite-scroll listings render more reviews as the page is scrolled.
//! The loop below scrolls until either enough reviews are visible or the
//! page stops growing, and never runs more than `max_attempts` iterations.

use crate::crawler::pacing::Pacing;
use crate::session::{PageSession, SessionResult};

/// Why the convergence loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvergeReason {
    /// At least the target number of review nodes is rendered
    TargetReached,
    /// The page height did not increase after a scroll
    HeightStable,
    /// The iteration bound was hit
    AttemptsExhausted,
}

/// Result of one convergence run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvergeOutcome {
    /// Iterations started, between 1 and `max_attempts`
    pub iterations: u32,
    /// Review nodes counted in the last iteration
    pub visible: usize,
    pub reason: ConvergeReason,
}

/// Scrolls `session` until `target` review nodes are visible or no new content loads
///
/// # Arguments
///
/// * `session` - A session with the page already loaded
/// * `target` - Review count that ends the loop early
/// * `max_attempts` - Hard bound on iterations
/// * `pacing` - Supplies the pause between a scroll and the next measurement
pub async fn converge(
    session: &mut dyn PageSession,
    target: usize,
    max_attempts: u32,
    pacing: &Pacing,
) -> SessionResult<ConvergeOutcome> {
    let mut last_height = session.measure_height().await?;
    let mut visible = 0;

    for attempt in 1..=max_attempts {
        visible = session.find_review_elements().await?.len();
        if visible >= target {
            return Ok(ConvergeOutcome {
                iterations: attempt,
                visible,
                reason: ConvergeReason::TargetReached,
            });
        }

        session.scroll_to_bottom().await?;
        pacing.scroll().await;

        let height = session.measure_height().await?;
        if height <= last_height {
            return Ok(ConvergeOutcome {
                iterations: attempt,
                visible,
                reason: ConvergeReason::HeightStable,
            });
        }
        last_height = height;
    }

    Ok(ConvergeOutcome {
        iterations: max_attempts,
        visible,
        reason: ConvergeReason::AttemptsExhausted,
    })
}
