//! Fuzzy string scorers on a 0-100 scale.
//!
//! - `ratio`: whole-string similarity (normalized Levenshtein)
//! - `partial_ratio`: best alignment of the shorter string inside the longer
//! - `token_sort_ratio`: `ratio` after sorting words, so word order is ignored

use strsim::normalized_levenshtein;

use crate::models::Score;

/// Lower-case, replace non-alphanumerics with spaces, collapse whitespace.
pub fn full_process(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whole-string similarity. Empty input scores 0.
pub fn ratio(a: &str, b: &str) -> Score {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    to_score(normalized_levenshtein(a, b))
}

/// Best `ratio` of the shorter string against every same-length window of
/// the longer one.
pub fn partial_ratio(a: &str, b: &str) -> Score {
    let (shorter, longer) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };
    if shorter.is_empty() {
        return 0;
    }

    let longer: Vec<char> = longer.chars().collect();
    let width = shorter.chars().count();
    let mut best = 0;

    for window in longer.windows(width) {
        let window: String = window.iter().collect();
        let score = ratio(shorter, &window);
        if score > best {
            best = score;
            if best == 100 {
                break;
            }
        }
    }

    best
}

/// Similarity ignoring word order and punctuation.
pub fn token_sort_ratio(a: &str, b: &str) -> Score {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Processed, word-sorted form used by `token_sort_ratio`.
pub fn sorted_tokens(text: &str) -> String {
    let processed = full_process(text);
    let mut tokens: Vec<&str> = processed.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn to_score(similarity: f64) -> Score {
    (similarity.clamp(0.0, 1.0) * 100.0).round() as Score
}
