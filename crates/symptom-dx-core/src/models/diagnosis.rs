//! Ranking output models.

use serde::{Deserialize, Serialize};

/// Similarity score on the 0-100 scale.
pub type Score = u8;

/// How one user symptom matched a disease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomMatch {
    /// The user's (normalized) symptom
    pub input: String,
    /// Best-matching disease symptom
    pub matched: String,
    /// Token-sort similarity (0-100)
    pub score: Score,
}

/// A candidate disease with its composite score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCandidate {
    /// Catalog disease name
    pub disease: String,
    /// Position of the disease in the catalog (tie-break key)
    pub catalog_index: usize,
    /// Number of per-symptom scores at or above the good-match threshold
    pub good_matches: usize,
    /// Mean per-symptom score, rounded to 1 decimal
    pub avg_score: f64,
    /// Composite ranking score, rounded to 2 decimals
    pub composite: f64,
    /// Per-symptom detail
    pub matches: Vec<SymptomMatch>,
}

/// Ordered top-K ranking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct RankedResult {
    /// Symptoms the ranking was computed from
    pub symptoms: Vec<String>,
    /// Candidates, best first
    pub candidates: Vec<ScoredCandidate>,
}

impl RankedResult {
    /// Best candidate, if any.
    pub fn top(&self) -> Option<&ScoredCandidate> {
        self.candidates.first()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Round to a fixed number of decimals.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
