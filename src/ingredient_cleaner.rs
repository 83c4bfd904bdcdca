//! # Ingredient Cleaner Module
//!
//! This module turns raw recipe ingredient lines into normalized search terms
//! that can be compared against product names.
//!
//! ## Features
//!
//! - Extraction of bracketed alternatives (`()` and `（）`), split on `・ , ， 、 /`
//! - Removal of quantities with glued units, bullets, emoji and stray symbols
//! - Support for Japanese script (hiragana, katakana, kanji) alongside latin text
//! - Whole-clause stopword filtering ("to taste", "g", "薬味", ...)
//! - Removal of measure words that accompany an ingredient name ("しょうゆ 大さじ")

use log::{debug, trace};
use serde::Serialize;
use std::fmt;

use crate::cleaner_patterns::{
    is_measure_token, ALTERNATIVE_SEPARATOR_REGEX, BRACKET_GROUP_REGEX, MEASURE_SUFFIX_REGEX,
    NOISE_REGEX, STOPWORDS,
};

/// A normalized, lowercased candidate ingredient name
///
/// Never empty and never made only of stopwords.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CleanedTerm(String);

impl CleanedTerm {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for CleanedTerm {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CleanedTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configuration options for ingredient cleaning
#[derive(Debug, Clone)]
pub struct CleanerConfig {
    /// Whether measure words next to an ingredient name are removed
    pub strip_measure_words: bool,
    /// Maximum length of a term in characters (truncated if longer)
    pub max_term_length: usize,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            strip_measure_words: true,
            max_term_length: 60,
        }
    }
}

/// Splits raw ingredient lines into cleaned candidate terms
#[derive(Debug, Clone, Default)]
pub struct IngredientCleaner {
    config: CleanerConfig,
}

impl IngredientCleaner {
    /// Create a cleaner with the default configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recipe_basket::ingredient_cleaner::IngredientCleaner;
    ///
    /// let cleaner = IngredientCleaner::new();
    /// let terms = cleaner.clean("しょうゆ(大さじ1)");
    /// assert_eq!(terms.len(), 2);
    /// assert_eq!(terms[0].as_str(), "大さじ");
    /// assert_eq!(terms[1].as_str(), "しょうゆ");
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CleanerConfig) -> Self {
        debug!(
            "Creating IngredientCleaner: strip_measure_words={}, max_term_length={}",
            config.strip_measure_words, config.max_term_length
        );
        Self { config }
    }

    /// Clean one raw ingredient line
    ///
    /// Returns the terms found inside brackets first (in order of appearance),
    /// followed by the main clause with the brackets removed. A line made only
    /// of numbers, punctuation or stopwords yields an empty list.
    pub fn clean(&self, raw_line: &str) -> Vec<CleanedTerm> {
        let mut terms = Vec::new();

        for captures in BRACKET_GROUP_REGEX.captures_iter(raw_line) {
            let group = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            trace!("Bracket group '{}' in line '{}'", group, raw_line);
            for alternative in ALTERNATIVE_SEPARATOR_REGEX.split(group) {
                if let Some(term) = self.clean_clause(alternative) {
                    terms.push(term);
                }
            }
        }

        let main_clause = BRACKET_GROUP_REGEX.replace_all(raw_line, " ");
        if let Some(term) = self.clean_clause(&main_clause) {
            terms.push(term);
        }

        debug!("Cleaned '{}' into {} term(s): {:?}", raw_line, terms.len(), terms);
        terms
    }

    /// Clean many raw lines and flatten the result, keeping order and duplicates
    pub fn clean_all<I, S>(&self, raw_lines: I) -> Vec<CleanedTerm>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw_lines
            .into_iter()
            .flat_map(|line| self.clean(line.as_ref()))
            .collect()
    }

    fn clean_clause(&self, clause: &str) -> Option<CleanedTerm> {
        let stripped = NOISE_REGEX.replace_all(clause, " ");
        let mut term = stripped
            .split_whitespace()
            .collect::<Vec<&str>>()
            .join(" ")
            .to_lowercase();

        if term.is_empty() {
            return None;
        }
        if term.split_whitespace().all(|token| STOPWORDS.contains(token)) {
            trace!("Dropping stopword clause '{}'", term);
            return None;
        }

        if self.config.strip_measure_words {
            term = strip_measure_words(&term);
            if term.is_empty() {
                trace!("Clause '{}' held only measure words", clause.trim());
                return None;
            }
        }

        if term.chars().count() > self.config.max_term_length {
            term = term.chars().take(self.config.max_term_length).collect();
            term = term.trim_end().to_string();
        }

        Some(CleanedTerm(term))
    }
}

/// Remove measure words that accompany an ingredient name.
///
/// A clause that is a single word keeps it unless a measure suffix can be cut
/// while leaving a name behind ("しょうゆ大さじ" -> "しょうゆ", "大さじ" stays).
/// In a multi-word clause every measure word or stopword is dropped.
fn strip_measure_words(term: &str) -> String {
    let tokens: Vec<&str> = term.split_whitespace().collect();

    if tokens.len() == 1 {
        return strip_measure_suffix(tokens[0]).unwrap_or(tokens[0]).to_string();
    }

    tokens
        .into_iter()
        .filter(|token| !is_measure_token(token))
        .filter_map(|token| match strip_measure_suffix(token) {
            Some(name) => Some(name),
            None if MEASURE_SUFFIX_REGEX.is_match(token) => None,
            None => Some(token),
        })
        .collect::<Vec<&str>>()
        .join(" ")
}

/// The token without its trailing measure words, if a non-empty name remains
fn strip_measure_suffix(token: &str) -> Option<&str> {
    let found = MEASURE_SUFFIX_REGEX.find(token)?;
    let name = token[..found.start()].trim_end();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Convenience function cleaning a line with the default configuration
pub fn clean_ingredient(raw_line: &str) -> Vec<CleanedTerm> {
    IngredientCleaner::new().clean(raw_line)
}
