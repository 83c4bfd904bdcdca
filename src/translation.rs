//! # Translation Module
//!
//! Best-effort translation of ingredient terms and product names.
//!
//! The pipeline only ever sees [`Translator::translate`], which cannot fail:
//! timeouts, HTTP errors, unsupported language pairs and an open circuit all
//! degrade to returning the input text unchanged. Successful results are
//! memoized per `(text, source, target)` for a bounded time.

use async_trait::async_trait;
use futures::future::join_all;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use unic_langid::LanguageIdentifier;

use crate::circuit_breaker::CircuitBreaker;
use crate::config::TranslatorConfig;
use crate::errors::TranslationError;

/// Upper bound on memoized entries before expired ones are pruned
const MAX_CACHE_ENTRIES: usize = 10_000;

/// An ISO-639-1 language code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    pub fn japanese() -> Self {
        Self("ja".to_string())
    }

    pub fn english() -> Self {
        Self("en".to_string())
    }

    /// Parse a language code, a BCP-47 tag or an English / native language name.
    ///
    /// ```rust
    /// use recipe_basket::translation::Language;
    ///
    /// assert_eq!(Language::parse("Japanese"), Language::japanese());
    /// assert_eq!(Language::parse("en-US"), Language::english());
    /// assert_eq!(Language::parse("日本語").code(), "ja");
    /// ```
    pub fn parse(input: &str) -> Self {
        let normalized = input.trim().to_lowercase();
        let code = match normalized.as_str() {
            "japanese" | "jp" | "jpn" | "日本語" | "にほんご" => "ja",
            "english" | "eng" | "英語" => "en",
            "french" | "français" | "francais" | "fra" => "fr",
            "german" | "deutsch" | "deu" => "de",
            "spanish" | "español" | "espanol" | "spa" => "es",
            "chinese" | "中文" | "中国語" | "zho" => "zh",
            "korean" | "한국어" | "韓国語" | "kor" => "ko",
            other => {
                return match other.parse::<LanguageIdentifier>() {
                    Ok(langid) => Self(langid.language.to_string()),
                    Err(_) => Self(other.to_string()),
                }
            }
        };
        Self(code.to_string())
    }

    pub fn code(&self) -> &str {
        &self.0
    }
}

impl FromStr for Language {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An external translation capability
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: &Language,
        target: &Language,
    ) -> Result<String, TranslationError>;
}

/// Request body for a LibreTranslate-style API
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Translation backend calling a LibreTranslate-compatible HTTP endpoint
#[derive(Clone)]
pub struct HttpTranslator {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
}

impl HttpTranslator {
    pub fn new(api_url: &str, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create translation HTTP client: {}", e))?;

        Ok(Self {
            client,
            api_url: api_url.to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl TranslationBackend for HttpTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &Language,
        target: &Language,
    ) -> Result<String, TranslationError> {
        let request = TranslateRequest {
            q: text,
            source: source.code(),
            target: target.code(),
            format: "text",
            api_key: self.api_key.as_deref(),
        };

        let response = self.client.post(&self.api_url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Translation API error: {} - {}", status, body);
            return Err(TranslationError::Status(status.as_u16()));
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::Decode(e.to_string()))?;

        debug!("Translated '{}' ({} -> {}): '{}'", text, source, target, body.translated_text);
        Ok(body.translated_text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    text: String,
    source: Language,
    target: Language,
}

#[derive(Debug, Clone)]
struct CachedTranslation {
    text: String,
    stored_at: Instant,
}

/// Fault-tolerant, memoizing front for a [`TranslationBackend`]
pub struct Translator {
    backend: Arc<dyn TranslationBackend>,
    config: TranslatorConfig,
    breaker: CircuitBreaker,
    cache: Mutex<HashMap<CacheKey, CachedTranslation>>,
}

impl Translator {
    pub fn new(backend: Arc<dyn TranslationBackend>, config: TranslatorConfig) -> Self {
        info!(
            "Creating Translator: timeout={}s, retries={}, breaker_threshold={}",
            config.operation_timeout_secs, config.max_retries, config.circuit_breaker_threshold
        );
        Self {
            backend,
            breaker: CircuitBreaker::new(&config),
            config,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<CacheKey, CachedTranslation>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Translate `text`, falling back to the original text on any failure
    pub async fn translate(&self, text: &str, source: &Language, target: &Language) -> String {
        if source == target || text.trim().is_empty() {
            return text.to_string();
        }

        let key = CacheKey {
            text: text.to_string(),
            source: source.clone(),
            target: target.clone(),
        };
        if let Some(cached) = self.cached(&key) {
            debug!("Translation cache hit for '{}' ({} -> {})", text, source, target);
            return cached;
        }

        if self.breaker.is_open() {
            warn!(
                "Translation circuit open, keeping '{}' untranslated ({} -> {})",
                text, source, target
            );
            return text.to_string();
        }

        match self.translate_with_retry(text, source, target).await {
            Ok(translated) => {
                self.breaker.record_success();
                self.store(key, &translated);
                translated
            }
            Err(e) => {
                self.breaker.record_failure();
                warn!(
                    "Translation of '{}' ({} -> {}) failed, using original text: {}",
                    text, source, target, e
                );
                text.to_string()
            }
        }
    }

    /// Translate many texts concurrently, returning results in input order.
    ///
    /// Repeated texts are sent to the backend once.
    pub async fn translate_all<S: AsRef<str>>(
        &self,
        texts: &[S],
        source: &Language,
        target: &Language,
    ) -> Vec<String> {
        let mut unique: Vec<&str> = Vec::new();
        for text in texts {
            if !unique.contains(&text.as_ref()) {
                unique.push(text.as_ref());
            }
        }

        let translated = join_all(
            unique
                .iter()
                .map(|text| self.translate(text, source, target)),
        )
        .await;

        let lookup: HashMap<&str, String> = unique.into_iter().zip(translated).collect();
        texts
            .iter()
            .map(|text| {
                lookup
                    .get(text.as_ref())
                    .cloned()
                    .unwrap_or_else(|| text.as_ref().to_string())
            })
            .collect()
    }

    async fn translate_with_retry(
        &self,
        text: &str,
        source: &Language,
        target: &Language,
    ) -> Result<String, TranslationError> {
        let mut last_error = TranslationError::Request("no attempt made".to_string());

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = self.retry_delay(attempt);
                debug!("Retrying translation of '{}' in {:?} (attempt {})", text, delay, attempt + 1);
                tokio::time::sleep(delay).await;
            }

            let call = self.backend.translate(text, source, target);
            let outcome = match tokio::time::timeout(self.config.operation_timeout(), call).await {
                Ok(Ok(translated)) if translated.trim().is_empty() => {
                    Err(TranslationError::Decode("empty translation".to_string()))
                }
                Ok(result) => result,
                Err(_) => Err(TranslationError::Timeout(format!(
                    "no answer within {}s",
                    self.config.operation_timeout_secs
                ))),
            };

            match outcome {
                Ok(translated) => return Ok(translated),
                Err(e) if !is_retryable(&e) => return Err(e),
                Err(e) => last_error = e,
            }
        }

        Err(last_error)
    }

    /// Exponential backoff with random jitter, capped at the configured maximum
    fn retry_delay(&self, attempt: u32) -> Duration {
        let exponential = self
            .config
            .base_retry_delay_ms
            .saturating_mul(1u64 << (attempt - 1).min(16));
        let capped = exponential.min(self.config.max_retry_delay_ms);
        let jitter = if capped > 0 {
            rand::thread_rng().gen_range(0..=capped / 2)
        } else {
            0
        };
        Duration::from_millis(capped.saturating_add(jitter).min(self.config.max_retry_delay_ms))
    }

    fn cached(&self, key: &CacheKey) -> Option<String> {
        let ttl = self.config.cache_ttl();
        let mut cache = self.cache();
        match cache.get(key) {
            Some(entry) if entry.stored_at.elapsed() < ttl => Some(entry.text.clone()),
            Some(_) => {
                cache.remove(key);
                None
            }
            None => None,
        }
    }

    fn store(&self, key: CacheKey, translated: &str) {
        let ttl = self.config.cache_ttl();
        let mut cache = self.cache();
        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        }
        cache.insert(
            key,
            CachedTranslation {
                text: translated.to_string(),
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear_cache(&self) {
        self.cache().clear();
    }

    pub fn cache_len(&self) -> usize {
        self.cache().len()
    }
}

/// Client errors other than rate limiting will not improve on retry
fn is_retryable(error: &TranslationError) -> bool {
    match error {
        TranslationError::Status(code) => *code == 429 || *code >= 500,
        TranslationError::CircuitOpen => false,
        _ => true,
    }
}
