//! Per-URL state definitions for the crawl worker
//!
//! A worker walks every URL through these states in order. `Failed` can be
//! entered from any non-terminal state.

use std::fmt;

/// Represents the current state of one URL inside a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitState {
    // ===== Active States =====
    /// The session is loading the page
    Navigating,

    /// Scrolling until enough reviews are rendered or no more load
    Converging,

    /// Reading fields out of the rendered review nodes
    Extracting,

    /// Picking the region shard for the page
    Classifying,

    /// Appending the page's batch to its shard
    Persisting,

    /// Appending the URL to the history log
    Recording,

    // ===== Terminal States =====
    /// The URL was recorded as processed
    Done,

    /// Processing stopped early
    Failed,
}

impl UnitState {
    /// Returns true for `Done` and `Failed`
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// The state that follows on success; terminal states have none
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Navigating => Some(Self::Converging),
            Self::Converging => Some(Self::Extracting),
            Self::Extracting => Some(Self::Classifying),
            Self::Classifying => Some(Self::Persisting),
            Self::Persisting => Some(Self::Recording),
            Self::Recording => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Whether a URL that fails in this state is still recorded as done
    ///
    /// Only navigation failures leave the URL eligible for a later run. A
    /// failure while recording cannot record anything.
    pub fn records_on_failure(&self) -> bool {
        matches!(
            self,
            Self::Converging | Self::Extracting | Self::Classifying | Self::Persisting
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Navigating => "navigating",
            Self::Converging => "converging",
            Self::Extracting => "extracting",
            Self::Classifying => "classifying",
            Self::Persisting => "persisting",
            Self::Recording => "recording",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Returns all states in walk order, `Failed` last
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Navigating,
            Self::Converging,
            Self::Extracting,
            Self::Classifying,
            Self::Persisting,
            Self::Recording,
            Self::Done,
            Self::Failed,
        ]
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
