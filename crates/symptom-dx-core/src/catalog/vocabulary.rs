//! Canonical symptom vocabulary derived from the catalog.

use std::collections::BTreeSet;

use crate::models::Disease;

/// Every canonical symptom named by at least one disease.
///
/// Iteration is lexicographic, which fixes the fuzzy-match tie-break order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymptomVocabulary {
    entries: BTreeSet<String>,
}

impl SymptomVocabulary {
    /// Union of all disease symptoms. Expects canonicalized diseases.
    pub fn from_diseases(diseases: &[Disease]) -> Self {
        let entries = diseases
            .iter()
            .flat_map(|d| d.symptoms.iter().cloned())
            .collect();
        Self { entries }
    }

    pub fn contains(&self, symptom: &str) -> bool {
        self.entries.contains(symptom)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for SymptomVocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(Into::into).collect(),
        }
    }
}
