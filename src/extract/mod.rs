//! Per-review field extraction
//!
//! A [`FieldExtractor`] reads author, text and score out of one review
//! element. Each field is reported independently as a [`FieldValue`], so a
//! broken score never costs the review its text; the defaults are applied
//! later, when the record is built.

mod selector;

pub use selector::SelectorExtractor;

use crate::session::ElementHandle;

/// Outcome of extracting one field from one element
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<T> {
    /// The field was present and well-formed
    Found(T),

    /// The element has no node for this field
    Missing,

    /// A node was found but its content could not be used
    Failed(String),
}

impl<T> FieldValue<T> {
    /// Returns the found value, or `default` for missing and failed fields
    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Self::Found(value) => value,
            Self::Missing | Self::Failed(_) => default,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl<T> From<Option<T>> for FieldValue<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Found(v),
            None => Self::Missing,
        }
    }
}

/// All fields read from one review element
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub author: FieldValue<String>,
    pub text: FieldValue<String>,
    pub score: FieldValue<f64>,
}

impl ExtractedFields {
    /// Fields for an element that yielded nothing
    pub fn missing() -> Self {
        Self {
            author: FieldValue::Missing,
            text: FieldValue::Missing,
            score: FieldValue::Missing,
        }
    }

    /// Number of fields that failed to extract
    pub fn failure_count(&self) -> usize {
        [
            self.author.is_failed(),
            self.text.is_failed(),
            self.score.is_failed(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

/// Reads review fields out of a rendered element
pub trait FieldExtractor: Send + Sync {
    fn extract(&self, element: &ElementHandle) -> ExtractedFields;
}

/// Parses a score such as `"8.4"` or `" 7,5 "`
pub fn parse_score(raw: &str) -> FieldValue<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return FieldValue::Missing;
    }

    match trimmed.replace(',', ".").parse::<f64>() {
        Ok(score) if score.is_finite() => FieldValue::Found(score),
        Ok(_) => FieldValue::Failed(format!("score '{}' is not finite", trimmed)),
        Err(e) => FieldValue::Failed(format!("score '{}': {}", trimmed, e)),
    }
}
