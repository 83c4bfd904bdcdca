//! # Configuration Module
//!
//! This module defines configuration structures for the matching pipeline,
//! including translation recovery settings, catalog caching and matching parameters.
//! Values are read from the environment (optionally via a `.env` file).

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

// Constants for pipeline configuration
pub const DEFAULT_CATALOG_LANGUAGE: &str = "ja";
pub const DEFAULT_MATCH_THRESHOLD: u8 = 85;
pub const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300; // 5 minutes
pub const DEFAULT_TRANSLATE_API_URL: &str = "http://localhost:5000/translate";
pub const DEFAULT_RECIPES_PATH: &str = "recipe_data/all_recipes.json";
pub const DEFAULT_TRANSLATION_CACHE_TTL_SECS: u64 = 3600; // 1 hour

/// Recovery configuration for translation calls
#[derive(Debug, Clone)]
pub struct TranslatorConfig {
    /// Maximum number of retry attempts after the first call
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub base_retry_delay_ms: u64,
    /// Maximum delay between retries in milliseconds
    pub max_retry_delay_ms: u64,
    /// Timeout for a single translation call in seconds
    pub operation_timeout_secs: u64,
    /// Circuit breaker failure threshold
    pub circuit_breaker_threshold: u32,
    /// Circuit breaker reset timeout in seconds
    pub circuit_breaker_reset_secs: u64,
    /// How long a memoized translation stays valid
    pub cache_ttl_secs: u64,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_retry_delay_ms: 200,
            max_retry_delay_ms: 2000,
            operation_timeout_secs: 10,
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60, // 1 minute
            cache_ttl_secs: DEFAULT_TRANSLATION_CACHE_TTL_SECS,
        }
    }
}

impl TranslatorConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

/// Top-level configuration for the binary and for wiring the resolver
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres connection string for the product catalog
    pub database_url: Option<String>,
    /// LibreTranslate-style endpoint
    pub translate_api_url: String,
    /// Optional API key for the translation endpoint
    pub translate_api_key: Option<String>,
    /// Language code the catalog product names are written in
    pub catalog_language: String,
    /// Minimum similarity (0-100) for a product match
    pub match_threshold: u8,
    /// How long one catalog snapshot is reused
    pub catalog_cache_ttl_secs: u64,
    /// Path of the fixed recipe collection
    pub recipes_path: String,
    /// Translation recovery settings
    pub translator: TranslatorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            translate_api_url: DEFAULT_TRANSLATE_API_URL.to_string(),
            translate_api_key: None,
            catalog_language: DEFAULT_CATALOG_LANGUAGE.to_string(),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            catalog_cache_ttl_secs: DEFAULT_CATALOG_CACHE_TTL_SECS,
            recipes_path: DEFAULT_RECIPES_PATH.to_string(),
            translator: TranslatorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        config.database_url = env::var("DATABASE_URL").ok();
        config.translate_api_key = env::var("TRANSLATE_API_KEY").ok().filter(|k| !k.is_empty());

        if let Ok(url) = env::var("TRANSLATE_API_URL") {
            config.translate_api_url = url;
        }
        if let Ok(language) = env::var("CATALOG_LANGUAGE") {
            config.catalog_language = language;
        }
        if let Ok(path) = env::var("RECIPES_PATH") {
            config.recipes_path = path;
        }
        if let Ok(raw) = env::var("MATCH_THRESHOLD") {
            let threshold: u8 = raw
                .parse()
                .with_context(|| format!("MATCH_THRESHOLD must be an integer, got '{raw}'"))?;
            if threshold > 100 {
                anyhow::bail!("MATCH_THRESHOLD must be between 0 and 100, got {threshold}");
            }
            config.match_threshold = threshold;
        }
        if let Ok(raw) = env::var("CATALOG_CACHE_TTL_SECS") {
            config.catalog_cache_ttl_secs = raw
                .parse()
                .with_context(|| format!("CATALOG_CACHE_TTL_SECS must be an integer, got '{raw}'"))?;
        }
        if let Ok(raw) = env::var("TRANSLATE_TIMEOUT_SECS") {
            config.translator.operation_timeout_secs = raw
                .parse()
                .with_context(|| format!("TRANSLATE_TIMEOUT_SECS must be an integer, got '{raw}'"))?;
        }

        Ok(config)
    }

    pub fn catalog_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.catalog_cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = AppConfig::default();
        assert_eq!(config.catalog_language, "ja");
        assert_eq!(config.match_threshold, 85);
        assert_eq!(config.catalog_cache_ttl(), Duration::from_secs(300));
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_translator_defaults_bound_the_call() {
        let config = TranslatorConfig::default();
        assert!(config.operation_timeout() > Duration::ZERO);
        assert!(config.base_retry_delay_ms <= config.max_retry_delay_ms);
        assert!(config.circuit_breaker_threshold > 0);
    }
}
