//! Scripted in-memory page sessions
//!
//! Serves pre-built listing pages from memory. Each page reveals its review
//! nodes a few at a time as it is scrolled, like an infinite-scroll listing.
//! Used to exercise workers and the dispatcher without a network.

use crate::session::{ElementHandle, PageSession, SessionError, SessionFactory, SessionResult};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Height of a page before any review is rendered
const BASE_HEIGHT: u64 = 1000;

/// Height added by each rendered review
const REVIEW_HEIGHT: u64 = 120;

/// One listing page as a scripted session renders it
#[derive(Debug, Clone, Default)]
pub struct ScriptedPage {
    elements: Vec<ElementHandle>,
    initially_visible: usize,
    per_scroll: usize,
    fail_queries: bool,
}

impl ScriptedPage {
    /// A page with every review rendered up front
    pub fn new(elements: Vec<ElementHandle>) -> Self {
        let initially_visible = elements.len();
        Self {
            elements,
            initially_visible,
            per_scroll: 0,
            fail_queries: false,
        }
    }

    /// A page showing `initially_visible` reviews and `per_scroll` more after each scroll
    pub fn infinite_scroll(
        elements: Vec<ElementHandle>,
        initially_visible: usize,
        per_scroll: usize,
    ) -> Self {
        Self {
            elements,
            initially_visible,
            per_scroll,
            fail_queries: false,
        }
    }

    /// A page that loads but fails every element or layout query
    pub fn broken() -> Self {
        Self {
            fail_queries: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
struct Journal {
    navigations: Mutex<Vec<String>>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Session over a fixed set of scripted pages
///
/// URLs without a page fail navigation.
pub struct ScriptedSession {
    pages: Arc<HashMap<String, ScriptedPage>>,
    journal: Arc<Journal>,
    current: Option<(ScriptedPage, usize)>,
}

impl ScriptedSession {
    fn loaded(&self) -> SessionResult<&(ScriptedPage, usize)> {
        let current = self.current.as_ref().ok_or(SessionError::NoPage)?;
        if current.0.fail_queries {
            return Err(SessionError::Query("page script crashed".to_string()));
        }
        Ok(current)
    }
}

#[async_trait]
impl PageSession for ScriptedSession {
    async fn navigate(&mut self, url: &str) -> SessionResult<()> {
        if let Ok(mut navigations) = self.journal.navigations.lock() {
            navigations.push(url.to_string());
        }

        match self.pages.get(url) {
            Some(page) => {
                let visible = page.initially_visible.min(page.elements.len());
                self.current = Some((page.clone(), visible));
                Ok(())
            }
            None => {
                self.current = None;
                Err(SessionError::navigation(url, "host unreachable"))
            }
        }
    }

    async fn scroll_to_bottom(&mut self) -> SessionResult<()> {
        self.loaded()?;
        if let Some((page, visible)) = self.current.as_mut() {
            *visible = (*visible + page.per_scroll).min(page.elements.len());
        }
        Ok(())
    }

    async fn measure_height(&mut self) -> SessionResult<u64> {
        let (_, visible) = self.loaded()?;
        Ok(BASE_HEIGHT + REVIEW_HEIGHT * *visible as u64)
    }

    async fn find_review_elements(&mut self) -> SessionResult<Vec<ElementHandle>> {
        let (page, visible) = self.loaded()?;
        Ok(page.elements[..*visible].to_vec())
    }

    async fn close(&mut self) -> SessionResult<()> {
        self.current = None;
        self.journal.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Opens [`ScriptedSession`]s and keeps a journal of what they did
#[derive(Debug, Clone, Default)]
pub struct ScriptedSessionFactory {
    pages: Arc<HashMap<String, ScriptedPage>>,
    failing_workers: HashSet<usize>,
    journal: Arc<Journal>,
}

impl ScriptedSessionFactory {
    pub fn new(pages: HashMap<String, ScriptedPage>) -> Self {
        Self {
            pages: Arc::new(pages),
            ..Self::default()
        }
    }

    /// Makes session creation fail for the given worker
    pub fn fail_worker(mut self, worker_id: usize) -> Self {
        self.failing_workers.insert(worker_id);
        self
    }

    /// Every URL any session navigated to, in call order per session
    pub fn navigations(&self) -> Vec<String> {
        self.journal
            .navigations
            .lock()
            .map(|navigations| navigations.clone())
            .unwrap_or_default()
    }

    pub fn opened(&self) -> usize {
        self.journal.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.journal.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionFactory for ScriptedSessionFactory {
    async fn open(&self, worker_id: usize) -> SessionResult<Box<dyn PageSession>> {
        if self.failing_workers.contains(&worker_id) {
            return Err(SessionError::Startup(format!(
                "driver for worker {} did not start",
                worker_id
            )));
        }

        self.journal.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            pages: Arc::clone(&self.pages),
            journal: Arc::clone(&self.journal),
            current: None,
        }))
    }
}
