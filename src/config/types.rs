use serde::Deserialize;

/// Main configuration structure for Review-Sweep
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub selectors: SelectorConfig,
    /// Region table, in lookup order. Empty means the built-in table.
    #[serde(rename = "region")]
    pub regions: Vec<RegionEntry>,
}

/// Worker pool and page pacing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of concurrent workers (one page session each)
    pub workers: u32,

    /// Maximum number of reviews taken from one listing page
    #[serde(rename = "target-reviews")]
    pub target_reviews: u32,

    /// Upper bound on scroll iterations per page
    #[serde(rename = "max-scroll-attempts")]
    pub max_scroll_attempts: u32,

    /// Wait after navigation so client-side rendering can settle
    #[serde(rename = "settle-delay")]
    pub settle_delay: DelayRange,

    /// Wait between scroll iterations
    #[serde(rename = "scroll-pause")]
    pub scroll_pause: DelayRange,

    /// Wait between two listing pages handled by the same worker
    #[serde(rename = "politeness-pause")]
    pub politeness_pause: DelayRange,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            target_reviews: 50,
            max_scroll_attempts: 15,
            settle_delay: DelayRange::new(3000, 5000),
            scroll_pause: DelayRange::new(2000, 4000),
            politeness_pause: DelayRange::new(3000, 6000),
        }
    }
}

/// Inclusive range of milliseconds a randomized pause is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DelayRange {
    #[serde(rename = "min-ms")]
    pub min_ms: u64,

    #[serde(rename = "max-ms")]
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A range that never sleeps
    pub const fn zero() -> Self {
        Self::new(0, 0)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "ReviewSweep".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }
}

/// Input configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Line-delimited list of listing page URLs
    #[serde(rename = "url-list")]
    pub url_list: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            url_list: "list_links.txt".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory holding the `reviews_<region>.jsonl` shards
    #[serde(rename = "dataset-dir")]
    pub dataset_dir: String,

    /// Append-only log of URLs already attempted
    #[serde(rename = "history-path")]
    pub history_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dataset_dir: "data_by_region".to_string(),
            history_path: "history_crawled.txt".to_string(),
        }
    }
}

/// CSS selectors for the listing site's review markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Matches one review node on the listing page
    #[serde(rename = "review-item")]
    pub review_item: String,

    /// Author name, relative to the review node
    pub author: String,

    /// Review body, relative to the review node
    pub text: String,

    /// Numeric score, relative to the review node
    pub score: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            review_item: "div.review-item, li.review-item".to_string(),
            author: ".ru-username".to_string(),
            text: ".rd-des".to_string(),
            score: ".review-points span".to_string(),
        }
    }
}

/// One region and the locality slugs that belong to it
#[derive(Debug, Clone, Deserialize)]
pub struct RegionEntry {
    pub name: String,
    pub localities: Vec<String>,
}
