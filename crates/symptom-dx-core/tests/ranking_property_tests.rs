//! Property-based tests for normalization and ranking.
//!
//! 1. Rankings are ordered, bounded by top_k and tie-stable
//! 2. Too few symptoms is always an error
//! 3. Normalization is idempotent
//! 4. Arbitrary text never panics the pipeline

use std::collections::BTreeSet;
use std::sync::LazyLock;

use proptest::prelude::*;
use symptom_dx_core::{Catalog, DiagnosisEngine, DiagnosisError, RankingPolicy};

static ENGINE: LazyLock<DiagnosisEngine> = LazyLock::new(|| {
    let catalog = Catalog::from_json_str(include_str!("../data/diseases.json")).unwrap();
    DiagnosisEngine::new(catalog)
});

// ============================================================================
// Strategies
// ============================================================================

/// Known vocabulary entries
fn vocabulary_symptom() -> impl Strategy<Value = String> {
    let entries: Vec<String> = ENGINE.catalog().vocabulary().iter().map(String::from).collect();
    prop::sample::select(entries)
}

/// Short free-form phrases
fn free_phrase() -> impl Strategy<Value = String> {
    "[a-z]{1,8}( [a-z]{1,8}){0,2}"
}

/// A mix of known and unknown symptoms
fn symptom_set() -> impl Strategy<Value = BTreeSet<String>> {
    prop::collection::btree_set(
        prop_oneof![3 => vocabulary_symptom(), 1 => free_phrase()],
        0..8,
    )
}

fn policy() -> impl Strategy<Value = RankingPolicy> {
    (0usize..5, 1usize..6, 0u8..=100, any::<bool>()).prop_map(
        |(min_required, top_k, good_match_threshold, strong_match_boost)| RankingPolicy {
            min_required,
            top_k,
            good_match_threshold,
            strong_match_boost,
        },
    )
}

// ============================================================================
// Ranking Invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn ranking_is_sorted_and_tie_stable(symptoms in symptom_set(), policy in policy()) {
        if let Ok(result) = ENGINE.rank(&symptoms, &policy) {
            for pair in result.candidates.windows(2) {
                prop_assert!(pair[0].composite >= pair[1].composite);
                if pair[0].composite == pair[1].composite {
                    prop_assert!(pair[0].catalog_index < pair[1].catalog_index);
                }
            }
        }
    }

    #[test]
    fn ranking_is_bounded_and_rankable(symptoms in symptom_set(), policy in policy()) {
        if let Ok(result) = ENGINE.rank(&symptoms, &policy) {
            prop_assert!(result.candidates.len() <= policy.top_k);
            for candidate in &result.candidates {
                let disease = &ENGINE.catalog().diseases()[candidate.catalog_index];
                prop_assert_eq!(&disease.name, &candidate.disease);
                prop_assert!(!disease.symptoms.is_empty());
                prop_assert!(candidate.good_matches <= symptoms.len());
                prop_assert!(candidate.avg_score <= 100.0);
            }
        }
    }

    #[test]
    fn too_few_symptoms_is_an_error(symptoms in symptom_set(), policy in policy()) {
        let result = ENGINE.rank(&symptoms, &policy);
        if symptoms.is_empty() || symptoms.len() < policy.min_required {
            let is_insufficient = matches!(
                result,
                Err(DiagnosisError::InsufficientSymptoms { found, .. }) if found == symptoms.len()
            );
            prop_assert!(is_insufficient);
        } else {
            prop_assert!(result.is_ok());
        }
    }
}

// ============================================================================
// Normalization Invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn normalize_is_idempotent(phrase in "[a-zA-Z' ]{0,30}") {
        let normalizer = ENGINE.normalizer();
        let once = normalizer.normalize(&phrase);
        prop_assert_eq!(normalizer.normalize(&once), once);
    }

    #[test]
    fn vocabulary_entries_stay_in_vocabulary(symptom in vocabulary_symptom()) {
        let normalized = ENGINE.normalizer().normalize(&symptom);
        prop_assert!(ENGINE.catalog().vocabulary().contains(&normalized));
    }

    #[test]
    fn arbitrary_text_never_panics(text in "\\PC{0,120}") {
        let _ = ENGINE.extract_symptoms(&text);
        let _ = ENGINE.diagnose_text(&text);
    }
}

#[test]
fn synonym_targets_are_fixed_points() {
    let normalizer = ENGINE.normalizer();

    for target in normalizer.synonyms().targets() {
        assert_eq!(normalizer.normalize(target), target);
    }
}
