//! Disease knowledge base.
//!
//! Loaded once at startup from a JSON document and shared read-only.
//! Accepted document forms:
//!
//! ```json
//! {"diseases": [{"name": "Flu", "symptoms": ["fever", "cough"]}]}
//! [{"name": "Flu", "symptoms": ["fever", "cough"]}]
//! ```

mod vocabulary;

pub use vocabulary::*;

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::models::Disease;

/// Catalog load errors. All of them are fatal at startup.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed catalog document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Disease record {index} has no name")]
    MissingName { index: usize },

    #[error("Duplicate disease name: {0}")]
    DuplicateName(String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// Wrapped document form.
#[derive(Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    diseases: Option<Vec<Disease>>,
}

/// Immutable disease catalog with its derived symptom vocabulary.
#[derive(Debug, Clone)]
pub struct Catalog {
    diseases: Vec<Disease>,
    vocabulary: SymptomVocabulary,
}

impl Catalog {
    /// Build a catalog from disease records.
    ///
    /// Symptoms are canonicalized, names validated, and the vocabulary derived.
    pub fn from_diseases(diseases: Vec<Disease>) -> CatalogResult<Self> {
        let mut validated: Vec<Disease> = Vec::with_capacity(diseases.len());

        for (index, mut disease) in diseases.into_iter().enumerate() {
            disease.canonicalize();
            if disease.name.is_empty() {
                return Err(CatalogError::MissingName { index });
            }
            if validated.iter().any(|d| d.has_name(&disease.name)) {
                return Err(CatalogError::DuplicateName(disease.name));
            }
            validated.push(disease);
        }

        let vocabulary = SymptomVocabulary::from_diseases(&validated);
        tracing::info!(
            diseases = validated.len(),
            vocabulary = vocabulary.len(),
            "Catalog loaded"
        );

        Ok(Self {
            diseases: validated,
            vocabulary,
        })
    }

    /// Parse a catalog document.
    ///
    /// A leading `[` selects the bare-array form; anything else is read as
    /// the wrapped object, so parse errors keep their line and column.
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let diseases = if json.trim_start().starts_with('[') {
            serde_json::from_str::<Vec<Disease>>(json)?
        } else {
            serde_json::from_str::<CatalogDocument>(json)?
                .diseases
                .unwrap_or_default()
        };
        Self::from_diseases(diseases)
    }

    /// Load a catalog document from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// All diseases in catalog order.
    pub fn diseases(&self) -> &[Disease] {
        &self.diseases
    }

    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary {
        &self.vocabulary
    }

    /// Find a disease by exact name, ignoring case and surrounding whitespace.
    pub fn get(&self, name: &str) -> Option<&Disease> {
        self.diseases.iter().find(|d| d.has_name(name))
    }

    /// Find a disease whose name appears inside free text.
    ///
    /// When several names appear, the longest one wins; equal lengths keep
    /// catalog order.
    pub fn find_mentioned_in(&self, text: &str) -> Option<&Disease> {
        let text = text.to_lowercase();
        let mut best: Option<&Disease> = None;

        for disease in &self.diseases {
            let name = disease.name.to_lowercase();
            if !text.contains(&name) {
                continue;
            }
            match best {
                Some(current) if current.name.len() >= disease.name.len() => {}
                _ => best = Some(disease),
            }
        }

        best
    }
}
