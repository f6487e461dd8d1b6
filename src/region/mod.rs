//! Region classification for listing URLs
//!
//! The first path segment of a listing URL is the locality slug
//! (`https://host/ha-noi/some-place` -> `ha-noi`). Localities are grouped into
//! regions through an ordered table; the region picks the shard file a
//! page's reviews are written to.

use crate::config::{Config, RegionEntry};
use url::Url;

/// Region for localities that match no table entry
pub const OTHER_REGION: &str = "Other";

/// Locality used when a URL has no usable first path segment
pub const UNKNOWN_LOCALITY: &str = "unknown";

/// One URL together with its routing information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlUnit {
    pub url: String,
    pub region: String,
    pub locality: String,
}

impl CrawlUnit {
    /// Name of the listing, taken from the last path segment of the URL
    pub fn source_name(&self) -> String {
        path_segments(&self.url)
            .into_iter()
            .rev()
            .find(|segment| !segment.is_empty())
            .unwrap_or_default()
    }
}

/// Maps listing URLs to (region, locality)
#[derive(Debug, Clone)]
pub struct RegionClassifier {
    regions: Vec<RegionEntry>,
}

impl RegionClassifier {
    /// Creates a classifier over the given table; earlier entries win
    pub fn new(regions: Vec<RegionEntry>) -> Self {
        Self { regions }
    }

    /// Uses the configured table, or the built-in one when none is configured
    pub fn from_config(config: &Config) -> Self {
        if config.regions.is_empty() {
            Self::default()
        } else {
            Self::new(config.regions.clone())
        }
    }

    /// The built-in table: northern, central and southern Vietnam
    pub fn default_table() -> Vec<RegionEntry> {
        fn entry(name: &str, localities: &[&str]) -> RegionEntry {
            RegionEntry {
                name: name.to_string(),
                localities: localities.iter().map(|l| l.to_string()).collect(),
            }
        }

        vec![
            entry(
                "MienBac",
                &["ha-noi", "hai-phong", "quang-ninh", "bac-ninh", "thai-nguyen"],
            ),
            entry(
                "MienTrung",
                &[
                    "da-nang",
                    "hue",
                    "khanh-hoa",
                    "nha-trang",
                    "quy-nhon",
                    "vinh",
                    "binh-dinh",
                    "quang-nam",
                ],
            ),
            entry(
                "MienNam",
                &[
                    "ho-chi-minh",
                    "can-tho",
                    "dong-nai",
                    "binh-duong",
                    "vung-tau",
                    "long-an",
                ],
            ),
        ]
    }

    /// Classifies a URL
    ///
    /// Total over any input: a URL without a path yields
    /// (`Other`, `unknown`), and an unmatched locality keeps its slug but
    /// falls into `Other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use review_sweep::region::RegionClassifier;
    ///
    /// let classifier = RegionClassifier::default();
    /// let unit = classifier.classify("https://example.org/ha-noi/some-place");
    /// assert_eq!(unit.region, "MienBac");
    /// assert_eq!(unit.locality, "ha-noi");
    /// ```
    pub fn classify(&self, url: &str) -> CrawlUnit {
        let locality = path_segments(url)
            .into_iter()
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or_else(|| UNKNOWN_LOCALITY.to_string());

        let region = self
            .regions
            .iter()
            .find(|entry| entry.localities.iter().any(|l| *l == locality))
            .map(|entry| entry.name.clone())
            .unwrap_or_else(|| OTHER_REGION.to_string());

        CrawlUnit {
            url: url.to_string(),
            region,
            locality,
        }
    }

    /// Every region a record can be routed to, `Other` last
    pub fn region_names(&self) -> Vec<String> {
        self.regions
            .iter()
            .map(|entry| entry.name.clone())
            .chain(std::iter::once(OTHER_REGION.to_string()))
            .collect()
    }
}

impl Default for RegionClassifier {
    fn default() -> Self {
        Self::new(Self::default_table())
    }
}

/// Splits the path of a URL into segments, dropping scheme, host, query and fragment
///
/// Input that does not parse as an absolute URL is treated as a bare path.
fn path_segments(url: &str) -> Vec<String> {
    let trimmed = url.trim();

    if let Ok(parsed) = Url::parse(trimmed) {
        if let Some(segments) = parsed.path_segments() {
            return segments.map(|s| s.to_string()).collect();
        }
        return Vec::new();
    }

    let path = trimmed.split(['?', '#']).next().unwrap_or_default();
    path.trim_start_matches('/')
        .split('/')
        .map(|s| s.to_string())
        .collect()
}
