//! Symptom extraction from free text.
//!
//! Two strategies:
//! - Token split: cut the text into segments and normalize each one
//! - Entities: take symptom-labeled spans from an entity recognizer as-is
//!
//! A failing recognizer degrades to token split for that call.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::SymptomVocabulary;

use super::normalizer::SymptomNormalizer;

/// Entity label consumed as a symptom mention.
pub const SYMPTOM_LABEL: &str = "SYMPTOM";

/// Segment boundaries: commas, semicolons, line breaks and a standalone "and".
static SEGMENT_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[,;\r\n]+|\s+and\s+").expect("segment boundary pattern is valid")
});

/// Entity recognizer errors.
#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("Entity extractor unavailable: {0}")]
    Unavailable(String),
}

pub type ExtractorResult<T> = Result<T, ExtractorError>;

/// A labeled span produced by an entity recognizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntitySpan {
    pub text: String,
    pub label: String,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
}

impl EntitySpan {
    pub fn symptom(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            label: SYMPTOM_LABEL.to_string(),
            start,
            end,
        }
    }

    pub fn is_symptom(&self) -> bool {
        self.label.eq_ignore_ascii_case(SYMPTOM_LABEL)
    }
}

/// Pre-trained entity extractor collaborator.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> ExtractorResult<Vec<EntitySpan>>;
}

/// How symptoms are pulled out of user text.
#[derive(Clone, Default)]
pub enum ExtractionStrategy {
    #[default]
    TokenSplit,
    Entities(Arc<dyn EntityRecognizer>),
}

impl fmt::Debug for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionStrategy::TokenSplit => f.write_str("TokenSplit"),
            ExtractionStrategy::Entities(_) => f.write_str("Entities(..)"),
        }
    }
}

/// Extractor bound to a normalizer and a strategy.
pub struct SymptomExtractor<'a> {
    normalizer: &'a SymptomNormalizer,
    strategy: &'a ExtractionStrategy,
}

impl<'a> SymptomExtractor<'a> {
    pub fn new(normalizer: &'a SymptomNormalizer, strategy: &'a ExtractionStrategy) -> Self {
        Self {
            normalizer,
            strategy,
        }
    }

    /// Extract a deduplicated symptom set from free text.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        match self.strategy {
            ExtractionStrategy::TokenSplit => self.extract_tokens(text),
            ExtractionStrategy::Entities(recognizer) => match recognizer.recognize(text) {
                Ok(spans) => symptoms_from_spans(&spans),
                Err(e) => {
                    tracing::warn!("Falling back to token split: {e}");
                    self.extract_tokens(text)
                }
            },
        }
    }

    /// Token-split strategy.
    pub fn extract_tokens(&self, text: &str) -> BTreeSet<String> {
        split_segments(text)
            .into_iter()
            .map(|segment| self.normalizer.normalize(segment))
            .filter(|symptom| !symptom.is_empty())
            .collect()
    }
}

/// Split text into trimmed, non-empty segments.
pub fn split_segments(text: &str) -> Vec<&str> {
    SEGMENT_BOUNDARY
        .split(text)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// Symptom-labeled spans, lower-cased, trimmed and deduplicated.
pub fn symptoms_from_spans(spans: &[EntitySpan]) -> BTreeSet<String> {
    spans
        .iter()
        .filter(|span| span.is_symptom())
        .map(|span| span.text.trim().to_lowercase())
        .filter(|text| !text.is_empty())
        .collect()
}

/// Recognizer that finds vocabulary phrases on word boundaries.
///
/// Longer phrases are claimed first; overlapping shorter hits are dropped.
/// Offsets are byte offsets into the lower-cased text.
#[derive(Debug, Clone)]
pub struct KeywordRecognizer {
    phrases: Vec<String>,
}

impl KeywordRecognizer {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut phrases: Vec<String> = phrases
            .into_iter()
            .map(|p| p.into().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        phrases.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        phrases.dedup();
        Self { phrases }
    }

    pub fn from_vocabulary(vocabulary: &SymptomVocabulary) -> Self {
        Self::new(vocabulary.iter())
    }

    /// Spans ordered by position.
    pub fn find(&self, text: &str) -> Vec<EntitySpan> {
        let text = text.to_lowercase();
        let mut spans: Vec<EntitySpan> = Vec::new();

        for phrase in &self.phrases {
            for (start, matched) in text.match_indices(phrase.as_str()) {
                let end = start + matched.len();
                if !on_word_boundary(&text, start, end) {
                    continue;
                }
                if spans.iter().any(|s| start < s.end && s.start < end) {
                    continue;
                }
                spans.push(EntitySpan::symptom(matched, start, end));
            }
        }

        spans.sort_by_key(|s| s.start);
        spans
    }
}

impl EntityRecognizer for KeywordRecognizer {
    fn recognize(&self, text: &str) -> ExtractorResult<Vec<EntitySpan>> {
        Ok(self.find(text))
    }
}

fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}
