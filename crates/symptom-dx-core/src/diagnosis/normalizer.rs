//! Symptom phrase normalizer.
//!
//! Handles:
//! - Synonym expansion (tired→fatigue, stomach hurts→abdominal pain)
//! - Approximate matching against the catalog vocabulary (partial ratio)
//! - Pass-through of unrecognized phrases so they still take part in ranking

use std::collections::{HashMap, HashSet};

use crate::catalog::SymptomVocabulary;
use crate::models::Score;

use super::similarity::{full_process, partial_ratio};

/// Minimum partial-ratio score for a vocabulary match.
pub const DEFAULT_NORMALIZE_THRESHOLD: Score = 75;

/// Raw phrase → canonical symptom.
#[derive(Debug, Clone, PartialEq)]
pub struct SynonymTable {
    entries: HashMap<String, String>,
    targets: HashSet<String>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SynonymTable {
    /// Table with the built-in synonyms.
    pub fn new() -> Self {
        let mut table = Self::empty();
        for (raw, canonical) in DEFAULT_SYNONYMS {
            table.insert(raw, canonical);
        }
        table
    }

    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            targets: HashSet::new(),
        }
    }

    /// Add or replace a mapping. Both sides are lower-cased and trimmed.
    pub fn insert(&mut self, raw: &str, canonical: &str) {
        let canonical = canonical.trim().to_lowercase();
        self.targets.insert(canonical.clone());

        if let Some(previous) = self.entries.insert(raw.trim().to_lowercase(), canonical) {
            if !self.entries.values().any(|v| *v == previous) {
                self.targets.remove(&previous);
            }
        }
    }

    /// Look up an already-normalized phrase.
    pub fn get(&self, phrase: &str) -> Option<&str> {
        self.entries.get(phrase).map(String::as_str)
    }

    /// Whether a normalized phrase is the canonical side of some mapping.
    pub fn is_target(&self, phrase: &str) -> bool {
        self.targets.contains(phrase)
    }

    /// Distinct canonical targets, sorted.
    pub fn targets(&self) -> impl Iterator<Item = &str> {
        let mut targets: Vec<&str> = self.targets.iter().map(String::as_str).collect();
        targets.sort_unstable();
        targets.into_iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> Extend<(K, V)> for SynonymTable {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (raw, canonical) in iter {
            self.insert(raw.as_ref(), canonical.as_ref());
        }
    }
}

/// Built-in synonyms for everyday symptom phrasing.
const DEFAULT_SYNONYMS: &[(&str, &str)] = &[
    ("body ache", "muscle pain"),
    ("body aches", "muscle pain"),
    ("tired", "fatigue"),
    ("weak", "fatigue"),
    ("lightheaded", "dizziness"),
    ("can't breathe", "shortness of breath"),
    ("breathing difficulty", "shortness of breath"),
    ("watery eyes", "itchy eyes"),
    ("sweating a lot", "sweating"),
    ("low mood", "persistent low mood"),
    ("heart racing", "palpitations"),
    ("numbness in feet", "numbness"),
    ("pain while swallowing", "sore throat"),
    ("stomach hurts", "abdominal pain"),
    ("stomach pain", "abdominal pain"),
    ("vomiting", "nausea"),
];

/// Maps raw phrases to canonical symptoms.
#[derive(Debug, Clone)]
pub struct SymptomNormalizer {
    synonyms: SynonymTable,
    vocabulary: SymptomVocabulary,
    threshold: Score,
}

impl SymptomNormalizer {
    /// Create a normalizer over a vocabulary with the built-in synonyms.
    pub fn new(vocabulary: SymptomVocabulary) -> Self {
        Self {
            synonyms: SynonymTable::new(),
            vocabulary,
            threshold: DEFAULT_NORMALIZE_THRESHOLD,
        }
    }

    pub fn with_synonyms(mut self, synonyms: SynonymTable) -> Self {
        self.synonyms = synonyms;
        self
    }

    pub fn with_threshold(mut self, threshold: Score) -> Self {
        self.threshold = threshold;
        self
    }

    /// Normalize one raw phrase.
    ///
    /// Synonym table first, then exact vocabulary entries and synonym
    /// targets as fixed points, then the best fuzzy vocabulary match at or
    /// above the threshold. Anything else comes back lower-cased and trimmed.
    pub fn normalize(&self, raw: &str) -> String {
        let phrase = raw.trim().to_lowercase();
        if phrase.is_empty() {
            return phrase;
        }

        if let Some(canonical) = self.synonyms.get(&phrase) {
            return canonical.to_string();
        }

        if self.vocabulary.contains(&phrase) || self.synonyms.is_target(&phrase) {
            return phrase;
        }

        match self.best_match(&phrase) {
            Some((entry, score)) if score >= self.threshold => entry.to_string(),
            _ => phrase,
        }
    }

    /// Highest-scoring vocabulary entry for a phrase.
    ///
    /// Ties keep the first entry in vocabulary (lexicographic) order.
    pub fn best_match(&self, phrase: &str) -> Option<(&str, Score)> {
        let query = full_process(phrase);
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(&str, Score)> = None;
        for entry in self.vocabulary.iter() {
            let score = partial_ratio(&query, &full_process(entry));
            match best {
                Some((_, top)) if top >= score => {}
                _ => best = Some((entry, score)),
            }
            if score == 100 {
                break;
            }
        }

        best
    }

    /// Add a custom synonym mapping.
    pub fn add_synonym(&mut self, raw: &str, canonical: &str) {
        self.synonyms.insert(raw, canonical);
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.vocabulary
    }

    pub fn threshold(&self) -> Score {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> SymptomNormalizer {
        let vocabulary: SymptomVocabulary = [
            "abdominal pain",
            "cough",
            "fatigue",
            "fever",
            "headache",
            "muscle pain",
            "nausea",
            "shortness of breath",
            "skin rash",
        ]
        .into_iter()
        .collect();
        SymptomNormalizer::new(vocabulary)
    }

    #[test]
    fn test_synonym_lookup() {
        let normalizer = normalizer();

        assert_eq!(normalizer.normalize("tired"), "fatigue");
        assert_eq!(normalizer.normalize("  Stomach Hurts "), "abdominal pain");
        assert_eq!(normalizer.normalize("BODY ACHES"), "muscle pain");
        assert_eq!(normalizer.normalize("can't breathe"), "shortness of breath");
    }

    #[test]
    fn test_exact_vocabulary_entry() {
        let normalizer = normalizer();
        assert_eq!(normalizer.normalize("Fever"), "fever");
        assert_eq!(normalizer.normalize("skin rash"), "skin rash");
    }

    #[test]
    fn test_fuzzy_substring_match() {
        let normalizer = normalizer();

        assert_eq!(normalizer.normalize("i have a fever"), "fever");
        assert_eq!(normalizer.normalize("a bad cough"), "cough");
        assert_eq!(normalizer.normalize("rash"), "skin rash");
    }

    #[test]
    fn test_fuzzy_typo_match() {
        let normalizer = normalizer();
        assert_eq!(normalizer.normalize("headach"), "headache");
    }

    #[test]
    fn test_unmatched_passes_through() {
        let normalizer = normalizer();

        assert_eq!(normalizer.normalize("  Blurry Vision "), "blurry vision");
        assert_eq!(normalizer.normalize(""), "");
        assert_eq!(normalizer.normalize("!!!"), "!!!");
    }

    #[test]
    fn test_best_match_tie_takes_first_entry() {
        let vocabulary: SymptomVocabulary = ["leg pain", "back pain"].into_iter().collect();
        let normalizer = SymptomNormalizer::new(vocabulary);

        // "pain" is a perfect partial match for both entries
        let (entry, score) = normalizer.best_match("pain").unwrap();
        assert_eq!(score, 100);
        assert_eq!(entry, "back pain");
    }

    #[test]
    fn test_threshold_is_configurable() {
        let strict = normalizer().with_threshold(100);
        assert_eq!(strict.normalize("headach"), "headache");
        assert_eq!(strict.normalize("feverr"), "fever");
        assert_eq!(strict.normalize("fevor"), "fevor");
    }

    #[test]
    fn test_custom_synonym() {
        let mut normalizer = normalizer();
        normalizer.add_synonym("Feeling Hot", "Fever");

        assert_eq!(normalizer.normalize("feeling hot"), "fever");
    }

    #[test]
    fn test_empty_vocabulary() {
        let normalizer = SymptomNormalizer::new(SymptomVocabulary::default());
        assert!(normalizer.best_match("fever").is_none());
        assert_eq!(normalizer.normalize("fever"), "fever");
    }

    #[test]
    fn test_synonym_targets_sorted() {
        let table = SynonymTable::new();
        let targets: Vec<&str> = table.targets().collect();

        assert!(targets.contains(&"fatigue"));
        assert_eq!(targets.iter().filter(|t| **t == "muscle pain").count(), 1);
        assert!(targets.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_synonym_target_outside_vocabulary_is_fixed() {
        // Only a longer phrase containing the target is in the vocabulary
        let vocabulary: SymptomVocabulary =
            ["chest pain", "palpitations at night"].into_iter().collect();
        let normalizer = SymptomNormalizer::new(vocabulary);

        let once = normalizer.normalize("heart racing");
        assert_eq!(once, "palpitations");
        assert_eq!(normalizer.normalize(&once), "palpitations");
        assert_eq!(normalizer.normalize("palpitations at night"), "palpitations at night");
    }

    #[test]
    fn test_replaced_synonym_drops_stale_target() {
        let mut table = SynonymTable::empty();
        table.insert("racing pulse", "tachycardia");
        assert!(table.is_target("tachycardia"));

        table.insert("Racing Pulse", "palpitations");

        assert!(!table.is_target("tachycardia"));
        assert!(table.is_target("palpitations"));
        assert_eq!(table.targets().collect::<Vec<_>>(), vec!["palpitations"]);
    }
}
