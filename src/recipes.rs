//! # Recipe Collection Module
//!
//! The fixed JSON recipe collection the assistant picks recipes from, plus the
//! helpers that turn a chosen recipe (or a model-written markdown recipe) into
//! raw ingredient lines for the resolver.

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

lazy_static! {
    static ref URL_REGEX: Regex =
        Regex::new(r"https?://\S+|www\.\S+").expect("URL pattern should be valid");
    static ref TRAILING_DESCRIPTION_REGEX: Regex =
        Regex::new(r"\s+-\s+.*$").expect("Trailing description pattern should be valid");
    static ref SQUARE_TAG_REGEX: Regex =
        Regex::new(r"\[.*?\]").expect("Square tag pattern should be valid");
    static ref INGREDIENTS_BLOCK_REGEX: Regex =
        Regex::new(r"(?s)#### Ingredients(.*?)(?:#### Instructions|### Recipe Selection|$)")
            .expect("Ingredients block pattern should be valid");
}

const CIRCLED_NUMBERS: [char; 10] = ['①', '②', '③', '④', '⑤', '⑥', '⑦', '⑧', '⑨', '⑩'];
const STEP_NUMBER_TERMINATORS: [char; 5] = ['.', ':', ')', '、', '．'];

/// One ingredient entry of a stored recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    /// Free-form amount, a string like "大さじ1" or a bare number
    #[serde(default)]
    pub quantity: Option<Value>,
}

impl RecipeIngredient {
    /// The name followed by the quantity, as one raw ingredient line
    pub fn raw_line(&self) -> String {
        let quantity = match &self.quantity {
            Some(Value::String(text)) => text.trim().to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        format!("{} {}", self.name.trim(), quantity).trim().to_string()
    }
}

/// A stored step, either plain text or an object with a description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeStep {
    Text(String),
    Detailed { description: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Servings {
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub raw_text: Option<String>,
}

/// A recipe of the collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(default)]
    pub title: String,
    /// Site the recipe came from
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub cooking_time: Option<Value>,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub steps: Vec<RecipeStep>,
    #[serde(default)]
    pub servings: Option<Servings>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub difficulty_level: Option<String>,
}

impl Recipe {
    /// Raw ingredient lines ("name quantity") for the resolver
    pub fn ingredient_lines(&self) -> Vec<String> {
        self.ingredients
            .iter()
            .map(RecipeIngredient::raw_line)
            .filter(|line| !line.is_empty())
            .collect()
    }

    /// Steps renumbered from 1, with their own numbering removed
    ///
    /// Plain-text steps stop at the first blank step.
    pub fn instructions(&self) -> Vec<String> {
        let mut instructions = Vec::new();

        for (index, step) in self.steps.iter().enumerate() {
            let text = match step {
                RecipeStep::Detailed { description } => description.trim().to_string(),
                RecipeStep::Text(text) => {
                    if text.trim().is_empty() {
                        break;
                    }
                    strip_step_number(text)
                }
            };
            instructions.push(format!("{}. {}", index + 1, text));
        }

        instructions
    }

    /// "value unit" when a value is stored, otherwise the raw servings text
    pub fn serving_size(&self) -> Option<String> {
        let servings = self.servings.as_ref()?;
        match &servings.value {
            Some(Value::Null) | None => servings.raw_text.clone(),
            Some(value) => {
                let value = match value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };
                let unit = servings.unit.as_deref().unwrap_or_default();
                Some(format!("{value} {unit}").trim().to_string())
            }
        }
    }

    pub fn total_time(&self) -> Option<String> {
        match self.cooking_time.as_ref()? {
            Value::Null => None,
            Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Remove a leading step marker: a circled numeral, "1.", "2)", "Step 3:", "a."
fn strip_step_number(step: &str) -> String {
    let step = step.trim();

    if let Some(first) = step.chars().next() {
        if CIRCLED_NUMBERS.contains(&first) {
            return step[first.len_utf8()..].trim().to_string();
        }

        let numbered = first.is_ascii_digit() || step.starts_with("Step") || "abcABC".contains(first);
        if numbered {
            for (offset, ch) in step.char_indices().skip(1) {
                if !STEP_NUMBER_TERMINATORS.contains(&ch) {
                    continue;
                }
                let marker = step[..offset].trim().replace("Step", "");
                let marker = marker.trim();
                if !marker.is_empty() && marker.chars().all(char::is_alphanumeric) {
                    return step[offset + ch.len_utf8()..].trim().to_string();
                }
            }
        }
    }

    step.to_string()
}

/// Normalize a recipe title for lookup.
///
/// ```rust
/// use recipe_basket::recipes::clean_recipe_title;
///
/// assert_eq!(clean_recipe_title("Miso Soup - a warm classic"), "Miso Soup");
/// assert_eq!(clean_recipe_title("[Easy] Curry Rice!"), "Curry Rice");
/// assert_eq!(clean_recipe_title("【簡単】肉じゃが https://example.com"), "【簡単】肉じゃが");
/// ```
pub fn clean_recipe_title(title: &str) -> String {
    let title = URL_REGEX.replace_all(title, "");
    let mut title = TRAILING_DESCRIPTION_REGEX.replace(&title, "").into_owned();

    if title.is_ascii() {
        title = SQUARE_TAG_REGEX.replace_all(&title, "").into_owned();
    }

    title
        .trim()
        .trim_end_matches(['.', ',', ';', ':', '!', '?'])
        .trim()
        .to_string()
}

/// The ingredient list of a markdown recipe written by the assistant
///
/// Returns the text under `#### Ingredients` up to the next instructions or
/// recipe-selection heading, or `None` when there is no such section.
pub fn extract_ingredients_block(markdown: &str) -> Option<String> {
    let block = INGREDIENTS_BLOCK_REGEX
        .captures(markdown)?
        .get(1)?
        .as_str()
        .trim()
        .to_string();
    debug!("Extracted ingredients block of {} chars", block.len());
    Some(block)
}

/// The fixed recipe collection
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

impl RecipeBook {
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    /// Load a JSON array of recipes
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe collection {}", path.display()))?;
        let recipes: Vec<Recipe> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse recipe collection {}", path.display()))?;

        info!("Loaded {} recipes from {}", recipes.len(), path.display());
        Ok(Self { recipes })
    }

    /// Recipe whose cleaned title equals the cleaned `title`
    pub fn find_exact(&self, title: &str) -> Option<&Recipe> {
        let wanted = clean_recipe_title(title);
        if wanted.is_empty() {
            return None;
        }
        let found = self
            .recipes
            .iter()
            .find(|recipe| recipe.title.trim() == wanted || clean_recipe_title(&recipe.title) == wanted);
        debug!("Recipe lookup '{}' -> found={}", wanted, found.is_some());
        found
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.recipes.iter().map(|recipe| recipe.title.as_str())
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
