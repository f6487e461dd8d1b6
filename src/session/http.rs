//! Static-HTML page session
//!
//! This module renders listing pages without a browser:
//! - Building an HTTP client with the crawler's user agent
//! - GET requests for listing pages, rejecting error statuses and non-HTML bodies
//! - Selecting review nodes from the fetched document
//!
//! A static document never grows, so scrolling is only counted and the
//! height metric is the body length. The convergence loop therefore stops
//! after its first scroll on height stability.

use crate::config::{Config, SelectorConfig, UserAgentConfig};
use crate::session::{ElementHandle, PageSession, SessionError, SessionFactory, SessionResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::time::Duration;

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use review_sweep::config::UserAgentConfig;
/// use review_sweep::session::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

struct LoadedPage {
    url: String,
    body: String,
}

/// Page session that fetches listing pages over HTTP
pub struct HttpPageSession {
    client: Client,
    review_item: Selector,
    page: Option<LoadedPage>,
    scrolls: u32,
}

impl HttpPageSession {
    pub fn new(client: Client, selectors: &SelectorConfig) -> SessionResult<Self> {
        let review_item = Selector::parse(&selectors.review_item).map_err(|e| {
            SessionError::Startup(format!(
                "invalid review-item selector '{}': {}",
                selectors.review_item, e
            ))
        })?;

        Ok(Self {
            client,
            review_item,
            page: None,
            scrolls: 0,
        })
    }

    /// Scroll actions issued since the last navigation
    pub fn scrolls(&self) -> u32 {
        self.scrolls
    }

    fn loaded(&self) -> SessionResult<&LoadedPage> {
        self.page.as_ref().ok_or(SessionError::NoPage)
    }
}

#[async_trait]
impl PageSession for HttpPageSession {
    async fn navigate(&mut self, url: &str) -> SessionResult<()> {
        self.page = None;
        self.scrolls = 0;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                SessionError::navigation(url, "request timeout")
            } else if e.is_connect() {
                SessionError::navigation(url, "connection refused")
            } else {
                SessionError::navigation(url, e)
            }
        })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(SessionError::navigation(url, "rate limited (HTTP 429)"));
        }
        if !status.is_success() {
            return Err(SessionError::navigation(
                url,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.contains("text/html") {
            return Err(SessionError::navigation(
                url,
                format!("expected HTML, got '{}'", content_type),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SessionError::navigation(url, e))?;

        tracing::trace!("Loaded {} ({} bytes)", url, body.len());
        self.page = Some(LoadedPage {
            url: url.to_string(),
            body,
        });
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> SessionResult<()> {
        self.loaded()?;
        self.scrolls += 1;
        Ok(())
    }

    async fn measure_height(&mut self) -> SessionResult<u64> {
        Ok(self.loaded()?.body.len() as u64)
    }

    async fn find_review_elements(&mut self) -> SessionResult<Vec<ElementHandle>> {
        let page = self.loaded()?;
        let elements = select_elements(&page.body, &self.review_item);
        tracing::trace!("{} review nodes on {}", elements.len(), page.url);
        Ok(elements)
    }

    async fn close(&mut self) -> SessionResult<()> {
        self.page = None;
        Ok(())
    }
}

/// Outer HTML of every node matching `selector`, in document order
fn select_elements(body: &str, selector: &Selector) -> Vec<ElementHandle> {
    let document = Html::parse_document(body);
    document
        .select(selector)
        .map(|node| ElementHandle::new(node.html()))
        .collect()
}

/// Opens one [`HttpPageSession`] per worker, each with its own client
#[derive(Debug, Clone)]
pub struct HttpSessionFactory {
    user_agent: UserAgentConfig,
    selectors: SelectorConfig,
}

impl HttpSessionFactory {
    pub fn new(config: &Config) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            selectors: config.selectors.clone(),
        }
    }
}

#[async_trait]
impl SessionFactory for HttpSessionFactory {
    async fn open(&self, worker_id: usize) -> SessionResult<Box<dyn PageSession>> {
        let client = build_http_client(&self.user_agent)
            .map_err(|e| SessionError::Startup(format!("worker {}: {}", worker_id, e)))?;
        let session = HttpPageSession::new(client, &self.selectors)?;
        Ok(Box::new(session))
    }
}
