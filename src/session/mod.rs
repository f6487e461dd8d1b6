//! Page session capability
//!
//! A [`PageSession`] renders listing pages for one worker: it navigates,
//! scrolls, measures the document and hands back the review nodes that are
//! currently rendered. Sessions are opened once per worker through a
//! [`SessionFactory`] and reused for every URL in that worker's partition.
//!
//! # Components
//!
//! - `PageSession`: the per-worker rendering handle
//! - `SessionFactory`: opens one session per worker
//! - `HttpPageSession`: a static-HTML session backed by reqwest and scraper
//! - `ScriptedSession`: serves in-memory pages (the `scripted` feature)

mod http;
#[cfg(any(test, feature = "scripted"))]
mod scripted;

pub use http::{build_http_client, HttpPageSession, HttpSessionFactory};
#[cfg(any(test, feature = "scripted"))]
pub use scripted::{ScriptedPage, ScriptedSession, ScriptedSessionFactory};

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by page sessions
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session could not be created; fatal for the owning worker
    #[error("Failed to start page session: {0}")]
    Startup(String),

    /// The page could not be loaded or rendered
    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// An operation needs a loaded page
    #[error("No page loaded")]
    NoPage,

    /// The page was loaded but could not be queried
    #[error("Page query failed: {0}")]
    Query(String),
}

impl SessionError {
    pub fn navigation(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Navigation {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Returns true for failures that leave the URL eligible for a later run
    pub fn is_navigation(&self) -> bool {
        matches!(self, Self::Navigation { .. })
    }
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// A rendered candidate review node
///
/// Carries the node's outer HTML so extraction does not need the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    html: String,
}

impl ElementHandle {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Rendering handle owned by exactly one worker
#[async_trait]
pub trait PageSession: Send {
    /// Loads the page; fails with `SessionError::Navigation`
    async fn navigate(&mut self, url: &str) -> SessionResult<()>;

    /// Issues one scroll-to-bottom action
    async fn scroll_to_bottom(&mut self) -> SessionResult<()>;

    /// Current document height, or an equivalent layout metric
    async fn measure_height(&mut self) -> SessionResult<u64>;

    /// All currently rendered review nodes, in document order
    async fn find_review_elements(&mut self) -> SessionResult<Vec<ElementHandle>>;

    /// Releases the session; called once when the worker finishes
    async fn close(&mut self) -> SessionResult<()>;
}

/// Opens page sessions for workers
#[async_trait]
pub trait SessionFactory: Send + Sync {
    /// Opens the session for worker `worker_id`; failure is session-fatal
    async fn open(&self, worker_id: usize) -> SessionResult<Box<dyn PageSession>>;
}
