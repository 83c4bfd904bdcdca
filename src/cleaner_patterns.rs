//! # Cleaner Patterns Module
//!
//! This module contains the regex patterns and word lists used to turn raw
//! recipe ingredient lines into candidate product search terms.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// Parenthesised alternatives, ASCII or full-width delimiters
pub const BRACKET_GROUP_PATTERN: &str = r"[（(](.*?)[）)]";

/// Separators between alternatives inside one bracket group
pub const ALTERNATIVE_SEPARATOR_PATTERN: &str = r"[・,，、/]";

// Quantities with glued units ("10g", "1/2", "2.5kg", "1個"), decorative dashes and bullets,
// two emoji seen in recipe data, and anything outside word characters, whitespace and the
// hiragana / katakana / kanji ranges. Units are only swallowed after a number, so a dash
// inside "all-purpose" removes the dash alone.
pub const NOISE_PATTERN: &str =
    r"\d[\d/.]*(?:[a-zA-Z]+|個|本|枚|片|かけ|束|袋|缶|パック|合)?|[-–—•/.]+|🌶|🌾|[^\w\sぁ-んァ-ンー一-龯]";

/// Japanese measure words glued to the end of an ingredient name ("しょうゆ大さじ")
pub const MEASURE_SUFFIX_PATTERN: &str =
    r"(?:大さじ|小さじ|カップ|少々|適量|適宜|少量|ひとつまみ|お好みで)+$";

lazy_static! {
    pub static ref BRACKET_GROUP_REGEX: Regex =
        Regex::new(BRACKET_GROUP_PATTERN).expect("Bracket group pattern should be valid");
    pub static ref ALTERNATIVE_SEPARATOR_REGEX: Regex = Regex::new(ALTERNATIVE_SEPARATOR_PATTERN)
        .expect("Alternative separator pattern should be valid");
    pub static ref NOISE_REGEX: Regex =
        Regex::new(NOISE_PATTERN).expect("Noise pattern should be valid");
    pub static ref MEASURE_SUFFIX_REGEX: Regex =
        Regex::new(MEASURE_SUFFIX_PATTERN).expect("Measure suffix pattern should be valid");

    /// Clauses made only of these words are dropped
    pub static ref STOPWORDS: HashSet<&'static str> = [
        // Measurement words
        "tablespoon", "tablespoons", "teaspoon", "teaspoons", "tbsp", "tsp",
        "cup", "cups", "g", "gram", "grams", "kg", "ml", "l", "cc", "oz",
        "pieces", "piece", "serving", "servings",
        // Preparation and filler words
        "medium", "fresh", "frozen", "mix", "chopped", "finely", "leaves", "wedges",
        "paste", "powder", "for", "to", "taste", "or", "and", "of",
        // Japanese filler headings
        "薬味", "香味野菜", "調味料", "材料",
    ]
    .into_iter()
    .collect();

    /// Quantity words that are removed when the clause still names something else
    pub static ref MEASURE_WORDS: HashSet<&'static str> = [
        "大さじ", "小さじ", "カップ", "少々", "適量", "適宜", "少量", "ひとつまみ", "お好みで",
        "個", "本", "枚", "片", "かけ", "束", "袋", "缶", "パック",
    ]
    .into_iter()
    .collect();
}

/// Whether a lowercased token is noise when it accompanies an ingredient name
pub fn is_measure_token(token: &str) -> bool {
    STOPWORDS.contains(token) || MEASURE_WORDS.contains(token)
}
