//! Review records
//!
//! One [`ReviewRecord`] is built per extracted review element and written to
//! its region shard as a single JSON line. Records are never modified after
//! construction.

use crate::extract::ExtractedFields;
use crate::region::CrawlUnit;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Author used when the element carries no usable name
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Score used when the element carries no usable score
pub const DEFAULT_SCORE: f64 = 0.0;

/// A single persisted review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    /// `{locality}_{5-digit suffix}`; unique only on a best-effort basis
    pub review_id: String,
    pub source_name: String,
    pub locality: String,
    pub author: String,
    pub text: String,
    pub score: f64,
}

impl ReviewRecord {
    /// Builds a record from extracted fields, applying the field defaults
    ///
    /// Returns None when the review has no text; such reviews are never
    /// persisted.
    pub fn from_fields(unit: &CrawlUnit, fields: ExtractedFields) -> Option<Self> {
        let text = fields.text.unwrap_or(String::new()).trim().to_string();
        if text.is_empty() {
            return None;
        }

        Some(Self {
            review_id: generate_review_id(&unit.locality),
            source_name: unit.source_name(),
            locality: unit.locality.clone(),
            author: fields.author.unwrap_or(DEFAULT_AUTHOR.to_string()),
            text,
            score: fields.score.unwrap_or(DEFAULT_SCORE),
        })
    }

    /// Serializes the record as one JSON line (without the newline)
    ///
    /// Non-ASCII text is written verbatim.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Generates `{locality}_{n}` with a random n in 10000..=99999
///
/// Collisions are possible and tolerated.
pub fn generate_review_id(locality: &str) -> String {
    let suffix: u32 = rand::thread_rng().gen_range(10000..=99999);
    format!("{}_{}", locality, suffix)
}
