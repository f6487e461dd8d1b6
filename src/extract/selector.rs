//! CSS-selector based field extraction
//!
//! Parses the element's outer HTML as a fragment and reads each field from
//! the first node matching its selector.

use crate::config::SelectorConfig;
use crate::extract::{parse_score, ExtractedFields, FieldExtractor, FieldValue};
use crate::session::ElementHandle;
use crate::ConfigError;
use scraper::{Html, Selector};

/// Extracts review fields with the configured selectors
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    author: Selector,
    text: Selector,
    score: Selector,
}

impl SelectorExtractor {
    /// Compiles the author, text and score selectors
    pub fn new(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            author: compile("author", &config.author)?,
            text: compile("text", &config.text)?,
            score: compile("score", &config.score)?,
        })
    }
}

impl FieldExtractor for SelectorExtractor {
    fn extract(&self, element: &ElementHandle) -> ExtractedFields {
        let fragment = Html::parse_fragment(element.html());

        ExtractedFields {
            author: first_text(&fragment, &self.author).into(),
            text: first_text(&fragment, &self.text).into(),
            score: match first_text(&fragment, &self.score) {
                Some(raw) => parse_score(&raw),
                None => FieldValue::Missing,
            },
        }
    }
}

fn compile(name: &str, selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|e| ConfigError::InvalidSelector {
        name: name.to_string(),
        message: e.to_string(),
    })
}

/// Text of the first matching node with whitespace runs collapsed
///
/// Returns None when nothing matches or the node holds only whitespace.
fn first_text(fragment: &Html, selector: &Selector) -> Option<String> {
    fragment
        .select(selector)
        .next()
        .map(|node| {
            node.text()
                .flat_map(|chunk| chunk.split_whitespace())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| !text.is_empty())
}
