//! Knowledge base models.

use serde::{Deserialize, Deserializer, Serialize};

/// A single disease record from the knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Disease {
    /// Display name, unique across the catalog (case-insensitive)
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Category label (e.g., "viral", "chronic")
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Canonical symptoms, lower-cased and deduplicated
    #[serde(default, deserialize_with = "null_as_default")]
    pub symptoms: Vec<String>,
    /// Known causes
    #[serde(default, deserialize_with = "null_as_default")]
    pub causes: String,
    /// Recommended treatment
    #[serde(default, deserialize_with = "null_as_default")]
    pub treatment: String,
    /// Home remedies, in the order they should be offered
    #[serde(default, deserialize_with = "null_as_default")]
    pub remedies: Vec<String>,
    /// Prevention advice
    #[serde(default, deserialize_with = "null_as_default")]
    pub prevention: String,
}

/// Treat an explicit `null` like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Disease {
    /// Create a disease with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: String::new(),
            symptoms: Vec::new(),
            causes: String::new(),
            treatment: String::new(),
            remedies: Vec::new(),
            prevention: String::new(),
        }
    }

    /// Builder-style helper to set the symptom list.
    pub fn with_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symptoms = symptoms.into_iter().map(Into::into).collect();
        self.canonicalize();
        self
    }

    /// Lower-case and trim symptoms, dropping blanks and repeats.
    ///
    /// First occurrence wins so the catalog order is preserved.
    pub fn canonicalize(&mut self) {
        let mut seen = Vec::with_capacity(self.symptoms.len());
        for symptom in self.symptoms.drain(..) {
            let symptom = symptom.trim().to_lowercase();
            if !symptom.is_empty() && !seen.contains(&symptom) {
                seen.push(symptom);
            }
        }
        self.symptoms = seen;
        self.name = self.name.trim().to_string();
    }

    /// Case-insensitive name comparison.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }

    /// Whether this disease can take part in ranking.
    pub fn is_rankable(&self) -> bool {
        !self.symptoms.is_empty()
    }

    /// Project the remedy-related fields.
    pub fn remedy_info(&self) -> RemedyInfo {
        RemedyInfo {
            name: self.name.clone(),
            remedies: self.remedies.clone(),
            treatment: self.treatment.clone(),
            prevention: self.prevention.clone(),
            causes: self.causes.clone(),
        }
    }
}

/// Remedy lookup result for a named disease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemedyInfo {
    pub name: String,
    pub remedies: Vec<String>,
    pub treatment: String,
    pub prevention: String,
    pub causes: String,
}
