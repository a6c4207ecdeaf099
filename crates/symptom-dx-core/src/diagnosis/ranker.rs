//! Disease ranking using a composite fuzzy-overlap score.
//!
//! Per disease:
//! - each user symptom takes its best token-sort score against the disease's symptoms
//! - good matches: scores at or above the good-match threshold
//! - composite = good_matches * 10 + avg_score / 10 (+15 strong-match boost when enabled)

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::models::{round_to, Disease, RankedResult, Score, ScoredCandidate, SymptomMatch};

use super::similarity::{ratio, sorted_tokens};
use super::{DiagnosisError, DiagnosisResult};

/// Points per good match.
const GOOD_MATCH_WEIGHT: f64 = 10.0;

/// Divisor applied to the average score.
const AVG_SCORE_DIVISOR: f64 = 10.0;

/// Bonus added when the strong-match boost applies.
pub const STRONG_MATCH_BONUS: f64 = 15.0;

/// Good matches needed for the strong-match boost.
pub const STRONG_MATCH_MIN_GOOD: usize = 3;

/// Ranking policy parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingPolicy {
    /// Fewer extracted symptoms than this is `InsufficientSymptoms`
    pub min_required: usize,
    /// Maximum candidates returned
    pub top_k: usize,
    /// Per-symptom score counted as a good match
    pub good_match_threshold: Score,
    /// Add `STRONG_MATCH_BONUS` once `STRONG_MATCH_MIN_GOOD` good matches are reached
    pub strong_match_boost: bool,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        Self {
            min_required: 2,
            top_k: 3,
            good_match_threshold: 70,
            strong_match_boost: false,
        }
    }
}

/// Scores catalog diseases against a symptom set.
pub struct Ranker<'a> {
    catalog: &'a Catalog,
}

impl<'a> Ranker<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Rank every disease with symptoms and return the top `policy.top_k`.
    ///
    /// Sorted by composite descending; equal composites keep catalog order.
    pub fn rank(
        &self,
        symptoms: &BTreeSet<String>,
        policy: &RankingPolicy,
    ) -> DiagnosisResult<RankedResult> {
        if symptoms.is_empty() || symptoms.len() < policy.min_required {
            return Err(DiagnosisError::InsufficientSymptoms {
                found: symptoms.len(),
                required: policy.min_required.max(1),
            });
        }

        let queries: Vec<(&str, String)> = symptoms
            .iter()
            .map(|s| (s.as_str(), sorted_tokens(s)))
            .collect();

        let mut candidates: Vec<ScoredCandidate> = self
            .catalog
            .diseases()
            .iter()
            .enumerate()
            .filter(|(_, disease)| disease.is_rankable())
            .map(|(index, disease)| score_disease(index, disease, &queries, policy))
            .collect();

        candidates.sort_by(|a, b| b.composite.total_cmp(&a.composite));
        candidates.truncate(policy.top_k);

        tracing::debug!(
            symptoms = symptoms.len(),
            returned = candidates.len(),
            top = candidates.first().map(|c| c.disease.as_str()),
            "Ranked diseases"
        );

        Ok(RankedResult {
            symptoms: symptoms.iter().cloned().collect(),
            candidates,
        })
    }
}

/// Score one disease. Expects a non-empty symptom list.
fn score_disease(
    catalog_index: usize,
    disease: &Disease,
    queries: &[(&str, String)],
    policy: &RankingPolicy,
) -> ScoredCandidate {
    let targets: Vec<(&str, String)> = disease
        .symptoms
        .iter()
        .map(|s| (s.as_str(), sorted_tokens(s)))
        .collect();

    let matches: Vec<SymptomMatch> = queries
        .iter()
        .filter_map(|(input, query)| {
            best_target(query, &targets).map(|(matched, score)| SymptomMatch {
                input: input.to_string(),
                matched: matched.to_string(),
                score,
            })
        })
        .collect();

    let good_matches = matches
        .iter()
        .filter(|m| m.score >= policy.good_match_threshold)
        .count();

    let avg_score = if matches.is_empty() {
        0.0
    } else {
        matches.iter().map(|m| f64::from(m.score)).sum::<f64>() / matches.len() as f64
    };

    let mut composite = good_matches as f64 * GOOD_MATCH_WEIGHT + avg_score / AVG_SCORE_DIVISOR;
    if policy.strong_match_boost && good_matches >= STRONG_MATCH_MIN_GOOD {
        composite += STRONG_MATCH_BONUS;
    }

    ScoredCandidate {
        disease: disease.name.clone(),
        catalog_index,
        good_matches,
        avg_score: round_to(avg_score, 1),
        composite: round_to(composite, 2),
        matches,
    }
}

/// Highest-scoring disease symptom; ties keep the first in disease order.
fn best_target<'t>(query: &str, targets: &'t [(&'t str, String)]) -> Option<(&'t str, Score)> {
    let mut best: Option<(&str, Score)> = None;
    for (symptom, sorted) in targets {
        let score = ratio(query, sorted);
        match best {
            Some((_, top)) if top >= score => {}
            _ => best = Some((*symptom, score)),
        }
    }
    best
}
