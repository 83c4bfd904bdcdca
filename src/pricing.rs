//! Price and tax descriptor parsing.
//!
//! Catalog prices come in loosely formatted strings ("1,234円", "¥98", "98.50").
//! Tax descriptors have the shape `"<percent>% <tax-inclusive price>"`, e.g. `"10% 108円"`.
//! Malformed input never fails: it degrades to `0.0` or to the whole string.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

lazy_static! {
    // A run of digits, optionally comma-grouped, optionally with decimals
    static ref PRICE_TOKEN_REGEX: Regex =
        Regex::new(r"[0-9][0-9,]*(?:\.[0-9]+)?").expect("Price token pattern should be valid");
    static ref LEADING_DIGITS_REGEX: Regex =
        Regex::new(r"^\s*([0-9]+)").expect("Leading digits pattern should be valid");
}

/// Extract the last numeric token of a price string.
///
/// ```rust
/// use recipe_basket::pricing::parse_price;
///
/// assert_eq!(parse_price("1,234円"), 1234.0);
/// assert_eq!(parse_price("税込 108.5 円"), 108.5);
/// assert_eq!(parse_price("no digits here"), 0.0);
/// ```
pub fn parse_price(price: &str) -> f64 {
    PRICE_TOKEN_REGEX
        .find_iter(price)
        .last()
        .and_then(|token| token.as_str().replace(',', "").parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// A parsed tax descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxDescriptor {
    /// Leading digits of the percentage part, `"0"` when absent
    pub rate: String,
    /// The tax-inclusive price fragment as written in the catalog
    pub inclusive_price: String,
}

impl TaxDescriptor {
    /// Split a descriptor on its first `%`.
    ///
    /// Without a `%` the whole (trimmed) string is the tax-inclusive price and the rate is `"0"`.
    pub fn parse(descriptor: &str) -> Self {
        match descriptor.split_once('%') {
            Some((rate_part, price_part)) => {
                let rate = LEADING_DIGITS_REGEX
                    .captures(rate_part)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| "0".to_string());
                Self {
                    rate,
                    inclusive_price: price_part.trim().to_string(),
                }
            }
            None => Self {
                rate: "0".to_string(),
                inclusive_price: descriptor.trim().to_string(),
            },
        }
    }

    /// Numeric value of the tax-inclusive price
    pub fn inclusive_amount(&self) -> f64 {
        parse_price(&self.inclusive_price)
    }

    pub fn rate_percent(&self) -> u32 {
        self.rate.parse().unwrap_or(0)
    }
}

/// Render an amount without a trailing `.0` for whole numbers
pub fn format_amount(amount: f64) -> String {
    if amount.fract() == 0.0 && amount.abs() < 1e15 {
        format!("{}", amount as i64)
    } else {
        format!("{amount:.2}")
    }
}
