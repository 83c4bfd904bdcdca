//! # Recipe Basket
//!
//! Turns recipe ingredient lists into purchasable product suggestions and keeps
//! a shopping cart of the chosen products.
//!
//! Raw ingredient lines are cleaned into search terms, translated into the
//! catalog's language when needed, fuzzily matched against the product catalog
//! and returned as [`resolver::FormattedProduct`]s that can be added to a
//! [`cart::Cart`].

pub mod cart;
pub mod catalog;
pub mod circuit_breaker;
pub mod cleaner_patterns;
pub mod config;
pub mod errors;
pub mod ingredient_cleaner;
pub mod localization;
pub mod pricing;
pub mod product_matcher;
pub mod recipes;
pub mod resolver;
pub mod translation;

pub use cart::{Cart, CartItem, RemoveOutcome};
pub use catalog::{CachedCatalog, InMemoryCatalog, PgCatalog, ProductCatalog, ProductRecord};
pub use errors::{CartError, CatalogError, TranslationError};
pub use ingredient_cleaner::{clean_ingredient, CleanedTerm, IngredientCleaner};
pub use product_matcher::{find_matches, ProductMatcher};
pub use resolver::{FormattedProduct, IngredientResolver, RecipeIngredients};
pub use translation::{HttpTranslator, Language, TranslationBackend, Translator};
