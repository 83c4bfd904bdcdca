//! # Localization Module
//!
//! Fluent-based presentation strings for product suggestions and cart summaries.
//! Resources for every supported language are compiled into the binary from
//! `locales/<lang>/main.ftl`. Unknown languages and keys missing from a
//! language fall back to English.

use anyhow::{Context, Result};
use fluent::FluentResource;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentValue};
use log::{debug, warn};
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

use crate::translation::Language;

const FALLBACK_LANGUAGE: &str = "en";

const RESOURCES: &[(&str, &str)] = &[
    ("en", include_str!("../locales/en/main.ftl")),
    ("ja", include_str!("../locales/ja/main.ftl")),
];

/// Localization manager holding one bundle per supported language
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a manager with every embedded language loaded
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();

        for (code, source) in RESOURCES {
            let bundle = Self::create_bundle(code, source)?;
            bundles.insert(code.to_string(), bundle);
        }

        debug!("Loaded {} localization bundle(s)", bundles.len());
        Ok(Self { bundles })
    }

    fn create_bundle(code: &str, source: &str) -> Result<FluentBundle<FluentResource>> {
        let locale: LanguageIdentifier = code
            .parse()
            .with_context(|| format!("Invalid locale identifier '{code}'"))?;
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Plain terminal output, no Unicode isolation marks around arguments
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow::anyhow!("Invalid {code} resource: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow::anyhow!("Conflicting {code} messages: {errors:?}"))?;

        Ok(bundle)
    }

    /// Whether a bundle exists for the language (code or name)
    pub fn is_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(Language::parse(language).code())
    }

    /// Render `key` in `language` with prepared Fluent arguments
    pub fn format(&self, key: &str, language: &str, args: Option<&FluentArgs>) -> String {
        let code = Language::parse(language);
        let requested = self.bundles.get(code.code());

        let found = requested
            .and_then(|bundle| bundle.get_message(key).map(|msg| (bundle, msg)))
            .or_else(|| {
                let fallback = self.bundles.get(FALLBACK_LANGUAGE)?;
                if requested.is_some() {
                    warn!("Message '{}' missing for '{}', using English", key, code);
                }
                fallback.get_message(key).map(|msg| (fallback, msg))
            });

        let Some((bundle, message)) = found else {
            return format!("Missing translation: {key}");
        };
        let Some(pattern) = message.value() else {
            return format!("Missing value for key: {key}");
        };

        let mut errors = vec![];
        let value = bundle.format_pattern(pattern, args, &mut errors);
        if !errors.is_empty() {
            debug!("Formatting '{}' reported {:?}", key, errors);
        }
        value.into_owned()
    }

    /// Get a localized message with string arguments
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(*value));
            }
            fluent_args
        });
        self.format(key, language, fluent_args.as_ref())
    }

    /// Get a localized message with string arguments given as pairs
    pub fn get_message_with_args(&self, key: &str, language: &str, args: &[(&str, &str)]) -> String {
        let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
        self.get_message_in_language(key, language, Some(&args_map))
    }
}
