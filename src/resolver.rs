//! # Ingredient Resolver Module
//!
//! Turns a recipe's raw ingredient text into purchasable product suggestions:
//! clean every line, translate the terms into the catalog's language when the
//! caller speaks another one, match them against the catalog snapshot and
//! format the matches in the caller's language.
//!
//! Only catalog failures are returned as errors. An empty suggestion list is a
//! successful resolution with nothing matched.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::catalog::{CachedCatalog, ProductCatalog, ProductRecord};
use crate::config::AppConfig;
use crate::errors::CatalogError;
use crate::ingredient_cleaner::{CleanedTerm, IngredientCleaner};
use crate::pricing::TaxDescriptor;
use crate::product_matcher::ProductMatcher;
use crate::translation::{Language, TranslationBackend, Translator};

/// Ingredient input as authored: one block of text or already-split lines
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeIngredients {
    /// Newline-separated lines; blank lines are dropped
    Text(String),
    /// One raw line per element
    Lines(Vec<String>),
}

impl RecipeIngredients {
    /// Flatten the input into raw ingredient lines
    pub fn into_lines(self) -> Vec<String> {
        match self {
            RecipeIngredients::Text(text) => text
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            RecipeIngredients::Lines(lines) => lines,
        }
    }
}

impl From<&str> for RecipeIngredients {
    fn from(text: &str) -> Self {
        RecipeIngredients::Text(text.to_string())
    }
}

impl From<String> for RecipeIngredients {
    fn from(text: String) -> Self {
        RecipeIngredients::Text(text)
    }
}

impl From<Vec<String>> for RecipeIngredients {
    fn from(lines: Vec<String>) -> Self {
        RecipeIngredients::Lines(lines)
    }
}

impl From<Vec<&str>> for RecipeIngredients {
    fn from(lines: Vec<&str>) -> Self {
        RecipeIngredients::Lines(lines.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for RecipeIngredients {
    fn from(lines: &[&str]) -> Self {
        RecipeIngredients::Lines(lines.iter().map(|line| line.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for RecipeIngredients {
    fn from(lines: [&str; N]) -> Self {
        RecipeIngredients::Lines(lines.iter().map(|line| line.to_string()).collect())
    }
}

/// A product suggestion ready for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedProduct {
    /// Product name in the requested language
    #[serde(rename = "Product_name")]
    pub product_name: String,
    /// Tax-inclusive price fragment, e.g. "108円"
    #[serde(rename = "Tax")]
    pub tax: String,
    /// Tax-exclusive price as stored in the catalog
    #[serde(rename = "Price")]
    pub price: String,
    /// Weight and unit, e.g. "500 ml"
    #[serde(rename = "Weight")]
    pub weight: String,
}

impl FormattedProduct {
    /// Format a catalog record under the given display name
    pub fn from_record(record: &ProductRecord, display_name: String) -> Self {
        Self {
            product_name: display_name,
            tax: TaxDescriptor::parse(&record.tax_descriptor).inclusive_price,
            price: record.price.clone(),
            weight: format!("{} {}", record.weight, record.unit).trim().to_string(),
        }
    }
}

/// Orchestrates cleaning, translation, catalog lookup and matching
pub struct IngredientResolver {
    cleaner: IngredientCleaner,
    translator: Arc<Translator>,
    catalog: CachedCatalog,
    catalog_language: Language,
    matcher: ProductMatcher,
}

impl IngredientResolver {
    pub fn new(
        translator: Arc<Translator>,
        catalog: CachedCatalog,
        catalog_language: Language,
        matcher: ProductMatcher,
    ) -> Self {
        info!(
            "Creating IngredientResolver: catalog_language={}, threshold={}",
            catalog_language,
            matcher.threshold()
        );
        Self {
            cleaner: IngredientCleaner::new(),
            translator,
            catalog,
            catalog_language,
            matcher,
        }
    }

    /// Wire a resolver from application configuration
    pub fn from_config(
        config: &AppConfig,
        catalog: Arc<dyn ProductCatalog>,
        backend: Arc<dyn TranslationBackend>,
    ) -> Self {
        let translator = Arc::new(Translator::new(backend, config.translator.clone()));
        let catalog = CachedCatalog::new(catalog, config.catalog_cache_ttl());
        Self::new(
            translator,
            catalog,
            Language::parse(&config.catalog_language),
            ProductMatcher::new(config.match_threshold),
        )
    }

    pub fn with_cleaner(mut self, cleaner: IngredientCleaner) -> Self {
        self.cleaner = cleaner;
        self
    }

    pub fn catalog_language(&self) -> &Language {
        &self.catalog_language
    }

    pub fn translator(&self) -> &Arc<Translator> {
        &self.translator
    }

    /// Force the next resolution to re-read the catalog
    pub async fn invalidate_catalog(&self) {
        self.catalog.invalidate().await;
    }

    /// Resolve recipe ingredients into product suggestions
    ///
    /// `requested_language` accepts a code ("ja", "en") or a name ("japanese").
    pub async fn resolve(
        &self,
        ingredients: impl Into<RecipeIngredients>,
        requested_language: &str,
    ) -> Result<Vec<FormattedProduct>, CatalogError> {
        let lines = ingredients.into().into_lines();
        let requested = Language::parse(requested_language);
        let needs_translation = requested != self.catalog_language;

        let cleaned: Vec<CleanedTerm> = self.cleaner.clean_all(&lines);
        info!(
            "Resolving {} ingredient line(s) into {} term(s) for '{}'",
            lines.len(),
            cleaned.len(),
            requested
        );

        let terms: Vec<String> = if needs_translation {
            self.translator
                .translate_all(&cleaned, &requested, &self.catalog_language)
                .await
        } else {
            cleaned.into_iter().map(CleanedTerm::into_string).collect()
        };
        debug!("Terms to match: {:?}", terms);

        let catalog = self.catalog.products().await.map_err(|e| {
            error!("Catalog read failed during resolution: {}", e);
            e
        })?;

        let matched = self.matcher.find_matches(&terms, &catalog);

        let names: Vec<String> = if needs_translation {
            let originals: Vec<&str> = matched.iter().map(|p| p.name.as_str()).collect();
            let translated = self
                .translator
                .translate_all(&originals, &self.catalog_language, &requested)
                .await;
            distinct_display_names(&originals, translated)
        } else {
            matched.iter().map(|p| p.name.clone()).collect()
        };

        let products: Vec<FormattedProduct> = matched
            .iter()
            .zip(names)
            .map(|(record, name)| FormattedProduct::from_record(record, name))
            .collect();

        info!("Resolved {} product suggestion(s)", products.len());
        Ok(products)
    }
}

/// Translated names, with every name shared by several products replaced by
/// that product's catalog name
fn distinct_display_names(originals: &[&str], translated: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &translated {
        *counts.entry(name.as_str()).or_default() += 1;
    }
    let colliding: HashSet<String> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, _)| name.to_string())
        .collect();

    if colliding.is_empty() {
        return translated;
    }
    debug!("Translated names shared by several products: {:?}", colliding);

    originals
        .iter()
        .zip(translated)
        .map(|(original, name)| {
            if colliding.contains(&name) {
                original.to_string()
            } else {
                name
            }
        })
        .collect()
}
