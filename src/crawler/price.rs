//! Price text normalization
//!
//! Merchant pages render prices in whatever format their locale prefers.
//! Both rules here turn that text into `"<amount with two decimals> <currency>"`
//! and never fail: text without a usable amount becomes [`PRICE_UNAVAILABLE`].

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Sentinel produced when no amount can be read from the price text
pub const PRICE_UNAVAILABLE: &str = "N/A";

/// A normalized price such as `"12.50 USD"` or `"N/A"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedPrice(String);

impl NormalizedPrice {
    pub fn unavailable() -> Self {
        Self(PRICE_UNAVAILABLE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strategy used to read an amount out of raw price text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceRule {
    /// Trailing `digits[.,]digits` run plus trailing currency text, `,` read as
    /// the decimal point: `"Price: 12,5 €"` -> `"12.50 €"`
    #[default]
    DecimalText,

    /// Integer amount in minor units plus a trailing currency symbol:
    /// `"150лв"` -> `"1.50 лв"`
    MinorUnits,
}

impl PriceRule {
    /// Normalizes raw price text with this rule
    pub fn normalize(&self, raw: &str) -> NormalizedPrice {
        let normalized = match self {
            Self::DecimalText => normalize_decimal_text(raw),
            Self::MinorUnits => normalize_minor_units(raw),
        };
        normalized.map(NormalizedPrice).unwrap_or_else(NormalizedPrice::unavailable)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DecimalText => "decimal-text",
            Self::MinorUnits => "minor-units",
        }
    }
}

fn decimal_text_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\d+[,.]?\d*)\s*(\D*)$").unwrap_or_else(|e| panic!("price pattern: {e}"))
    })
}

fn normalize_decimal_text(raw: &str) -> Option<String> {
    let captures = decimal_text_pattern().captures(raw)?;
    let amount: f64 = captures[1].replacen(',', ".", 1).parse().ok()?;
    let currency = captures[2].trim();

    Some(format!("{} {}", format_two_decimals(amount), currency).trim().to_string())
}

/// Formats a non-negative amount with two decimals, rounding exact ties up
///
/// `{:.2}` breaks ties to even, so `0.125` would print as `0.12`.
fn format_two_decimals(amount: f64) -> String {
    // A double sitting exactly on a third-decimal tie is an odd multiple of 1/8
    let eighths = amount * 8.0;
    if eighths.fract() == 0.0 && eighths % 2.0 == 1.0 {
        let cents = (amount * 100.0).ceil();
        return format!("{:.2}", cents / 100.0);
    }
    format!("{:.2}", amount)
}

fn normalize_minor_units(raw: &str) -> Option<String> {
    let raw = raw.trim();

    // The currency symbol is the trailing run of non-digit, non-space chars
    let symbol_start = raw
        .char_indices()
        .rev()
        .take_while(|(_, c)| !c.is_ascii_digit() && !c.is_whitespace())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(raw.len());
    let (amount_text, symbol) = raw.split_at(symbol_start);

    let digits: String = amount_text
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let minor: u64 = digits.parse().ok()?;
    let amount = minor as f64 / 100.0;

    Some(format!("{} {}", format_two_decimals(amount), symbol).trim().to_string())
}
