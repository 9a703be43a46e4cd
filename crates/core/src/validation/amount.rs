//! Currency amount parsing for handwritten and typed amounts.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

use crate::constants::CURRENCY_SCALE;
use crate::errors::ValidationError;

/// Currency markers accepted before or after the number, matched ignoring ASCII case.
/// Longer markers come first so `Rs.` wins over `Rs`.
const CURRENCY_MARKERS: [&str; 11] = [
    "rs.", "inr", "usd", "eur", "gbp", "rs", "$", "€", "£", "₹", "¥",
];

static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{1,2})?$").expect("amount pattern compiles")
});

/// Parses a raw amount into a positive decimal rescaled to two places.
///
/// Accepts well-formed `,` thousands groups and one currency marker on either
/// side. Negative, zero, malformed or over-precise values are rejected.
pub fn parse_amount(raw: &str) -> Result<Decimal, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidAmount("amount is empty".to_string()));
    }

    let mut body = strip_currency(trimmed);
    let mut negative = false;
    if let Some(rest) = body.strip_prefix('-').or_else(|| body.strip_prefix('\u{2212}')) {
        negative = true;
        body = strip_currency(rest);
    } else if body.starts_with('(') && body.ends_with(')') && body.len() >= 2 {
        negative = true;
        body = strip_currency(&body[1..body.len() - 1]);
    } else if let Some(rest) = body.strip_prefix('+') {
        body = strip_currency(rest);
    }

    if !AMOUNT_PATTERN.is_match(body) {
        return Err(ValidationError::InvalidAmount(format!(
            "'{}' is not a valid amount",
            trimmed
        )));
    }

    let digits: String = body.chars().filter(|c| *c != ',').collect();
    let mut value = Decimal::from_str(&digits)
        .map_err(|e| ValidationError::InvalidAmount(format!("'{}': {}", trimmed, e)))?;

    if negative || value <= Decimal::ZERO {
        return Err(ValidationError::InvalidAmount(format!(
            "'{}' must be greater than zero",
            trimmed
        )));
    }

    value.rescale(CURRENCY_SCALE);
    Ok(value)
}

/// Strips currency markers and whitespace from both ends until none remain.
fn strip_currency(input: &str) -> &str {
    let mut s = input.trim();
    loop {
        let before = s.len();
        for marker in CURRENCY_MARKERS {
            if let Some(head) = s.get(..marker.len()) {
                if head.eq_ignore_ascii_case(marker) {
                    s = s[marker.len()..].trim_start();
                }
            }
            if s.len() >= marker.len() {
                let cut = s.len() - marker.len();
                if let Some(tail) = s.get(cut..) {
                    if tail.eq_ignore_ascii_case(marker) {
                        s = s[..cut].trim_end();
                    }
                }
            }
        }
        if s.len() == before {
            return s;
        }
    }
}
