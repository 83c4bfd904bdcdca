//! # Error Types Module
//!
//! This module defines the error types used across the matching pipeline.
//! Only catalog failures are allowed to reach callers of the resolver;
//! translation errors are absorbed by the adapter and cart conditions are
//! reported as outcomes.

/// Errors raised while reading the product catalog
#[derive(Debug, Clone)]
pub enum CatalogError {
    /// Could not reach the catalog store
    Connection(String),
    /// The catalog query failed or returned undecodable rows
    Query(String),
    /// The catalog source is not configured or otherwise unavailable
    Unavailable(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Connection(msg) => write!(f, "Catalog connection error: {msg}"),
            CatalogError::Query(msg) => write!(f, "Catalog query error: {msg}"),
            CatalogError::Unavailable(msg) => write!(f, "Catalog unavailable: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Configuration(_) => CatalogError::Connection(err.to_string()),
            other => CatalogError::Query(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for CatalogError {
    fn from(err: anyhow::Error) -> Self {
        CatalogError::Unavailable(err.to_string())
    }
}

/// Errors raised by a translation backend
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationError {
    /// The request could not be sent
    Request(String),
    /// The service answered with a non-success status
    Status(u16),
    /// The response body could not be decoded
    Decode(String),
    /// The call did not finish in time
    Timeout(String),
    /// Too many recent failures, calls are short-circuited
    CircuitOpen,
}

impl std::fmt::Display for TranslationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationError::Request(msg) => write!(f, "Translation request error: {msg}"),
            TranslationError::Status(code) => write!(f, "Translation service returned status {code}"),
            TranslationError::Decode(msg) => write!(f, "Translation decode error: {msg}"),
            TranslationError::Timeout(msg) => write!(f, "Translation timeout: {msg}"),
            TranslationError::CircuitOpen => write!(f, "Translation circuit breaker is open"),
        }
    }
}

impl std::error::Error for TranslationError {}

impl From<reqwest::Error> for TranslationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TranslationError::Timeout(err.to_string())
        } else if err.is_decode() {
            TranslationError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            TranslationError::Status(status.as_u16())
        } else {
            TranslationError::Request(err.to_string())
        }
    }
}

/// Errors raised by cart mutations
#[derive(Debug, Clone, PartialEq)]
pub enum CartError {
    /// Quantities added to the cart must be positive
    InvalidQuantity(u32),
    /// The merged quantity of an item would exceed `u32::MAX`
    QuantityOverflow { product_name: String, quantity: u32 },
}

impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartError::InvalidQuantity(qty) => {
                write!(f, "Quantity must be a positive integer, got {qty}")
            }
            CartError::QuantityOverflow {
                product_name,
                quantity,
            } => {
                write!(f, "Cannot add {quantity} more of '{product_name}': quantity too large")
            }
        }
    }
}

impl std::error::Error for CartError {}
