//! # Product Matcher Module
//!
//! Fuzzy matching of cleaned ingredient terms against catalog product names.
//!
//! Names and terms are compared after lowercasing and removing all whitespace,
//! with a character-level normalized Levenshtein similarity on a 0-100 scale.
//! Character-level scoring lets compound Japanese names without spaces
//! ("玉ねぎ小") still compare sensibly.
//!
//! Each term contributes at most its single best-scoring product, and only when
//! that score reaches the threshold. A high default threshold favours precision:
//! suggesting nothing is better than suggesting the wrong product.

use log::{debug, info};
use std::collections::{BTreeMap, HashSet};
use strsim::normalized_levenshtein;

use crate::catalog::ProductRecord;

/// Minimum similarity (0-100) for a product to count as a match
pub const DEFAULT_THRESHOLD: u8 = 85;

/// Lowercase and drop every whitespace character
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Similarity of two already-normalized strings on a 0-100 scale
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(a, b) * 100.0
}

struct MatchResult<'a> {
    key: &'a str,
    record: &'a ProductRecord,
    score: f64,
}

/// Catalog names indexed by normalized form, last record wins on collision
struct NameIndex<'a> {
    entries: BTreeMap<String, &'a ProductRecord>,
}

impl<'a> NameIndex<'a> {
    fn build(catalog: &'a [ProductRecord]) -> Self {
        let mut entries = BTreeMap::new();
        for record in catalog {
            let key = normalize_name(&record.name);
            if let Some(previous) = entries.insert(key, record) {
                debug!(
                    "Normalized name collision: '{}' replaced by '{}'",
                    previous.name, record.name
                );
            }
        }
        Self { entries }
    }

    /// Highest-scoring entry for a normalized term; ties keep the first key in order
    fn best_match(&self, term: &str) -> Option<MatchResult<'_>> {
        let mut best: Option<MatchResult<'_>> = None;
        for (key, record) in &self.entries {
            let score = similarity(term, key);
            if best.as_ref().map_or(true, |current| score > current.score) {
                best = Some(MatchResult {
                    key,
                    record,
                    score,
                });
            }
        }
        best
    }
}

/// Threshold-based fuzzy matcher
#[derive(Debug, Clone)]
pub struct ProductMatcher {
    threshold: u8,
}

impl Default for ProductMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl ProductMatcher {
    /// Create a matcher; thresholds above 100 are clamped to 100
    pub fn new(threshold: u8) -> Self {
        Self {
            threshold: threshold.min(100),
        }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Products matching any of `terms`, deduplicated, in order of first match
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recipe_basket::catalog::ProductRecord;
    /// use recipe_basket::product_matcher::ProductMatcher;
    ///
    /// let catalog = vec![
    ///     ProductRecord::new("しょうゆ", "10% 108円", "98", 500.0, "ml"),
    ///     ProductRecord::new("Olive Oil", "8% 540円", "500", 450.0, "g"),
    /// ];
    /// let matcher = ProductMatcher::default();
    ///
    /// let found = matcher.find_matches(&["olive oil", "しょうゆ", "しょうゆ"], &catalog);
    /// assert_eq!(found.len(), 2);
    /// assert_eq!(found[0].name, "Olive Oil");
    /// ```
    pub fn find_matches<S: AsRef<str>>(
        &self,
        terms: &[S],
        catalog: &[ProductRecord],
    ) -> Vec<ProductRecord> {
        let index = NameIndex::build(catalog);
        let mut seen: HashSet<&str> = HashSet::new();
        let mut matches = Vec::new();

        for term in terms {
            let normalized = normalize_name(term.as_ref());
            if normalized.is_empty() {
                continue;
            }

            let Some(best) = index.best_match(&normalized) else {
                continue;
            };

            if best.score >= f64::from(self.threshold) {
                debug!(
                    "Term '{}' matched '{}' (score {:.1})",
                    term.as_ref(),
                    best.record.name,
                    best.score
                );
                if seen.insert(best.key) {
                    matches.push(best.record.clone());
                }
            } else {
                debug!(
                    "Term '{}' has no match (best '{}' scored {:.1} < {})",
                    term.as_ref(),
                    best.record.name,
                    best.score,
                    self.threshold
                );
            }
        }

        info!(
            "Matched {} product(s) from {} term(s) against {} catalog entries",
            matches.len(),
            terms.len(),
            catalog.len()
        );
        matches
    }
}

/// Match with an explicit threshold
pub fn find_matches<S: AsRef<str>>(
    terms: &[S],
    catalog: &[ProductRecord],
    threshold: u8,
) -> Vec<ProductRecord> {
    ProductMatcher::new(threshold).find_matches(terms, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<ProductRecord> {
        vec![
            ProductRecord::new("しょうゆ", "10% 108円", "98", 500.0, "ml"),
            ProductRecord::new("濃口しょうゆ", "10% 216円", "196", 1000.0, "ml"),
            ProductRecord::new("Green Onion", "8% 162円", "150", 100.0, "g"),
        ]
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name(" Green  Onion "), "greenonion");
        assert_eq!(normalize_name("玉ねぎ　小"), "玉ねぎ小");
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("abc", "abc"), 100.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_whitespace_and_case_insensitive() {
        let found = find_matches(&["green onion"], &catalog(), 100);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Green Onion");
    }

    #[test]
    fn test_best_match_only() {
        let found = find_matches(&["しょうゆ"], &catalog(), 50);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "しょうゆ");
    }

    #[test]
    fn test_below_threshold_yields_nothing() {
        assert!(find_matches(&["砂糖"], &catalog(), 85).is_empty());
        assert!(find_matches(&["   "], &catalog(), 0).is_empty());
    }

    #[test]
    fn test_duplicates_collapse() {
        let found = find_matches(&["しょうゆ", "しょうゆ ", "ショウユ"], &catalog(), 85);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_empty_catalog() {
        assert!(find_matches(&["しょうゆ"], &[], 0).is_empty());
    }

    #[test]
    fn test_threshold_clamped() {
        assert_eq!(ProductMatcher::new(150).threshold(), 100);
    }
}
