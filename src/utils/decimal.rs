//! Decimal value model.
//!
//! On-chain amounts and exchange rates arrive as strings (some price APIs send
//! JSON numbers instead). Every one of them is parsed into a [`BigDecimal`]
//! before any arithmetic happens, and nothing in the derivation path ever goes
//! through `f64`.

use bigdecimal::BigDecimal;
use log::warn;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

// ============================================
// Parsing
// ============================================

/// Parse an optional decimal string, returning `None` for absent, empty or
/// unparseable input.
///
/// Unparseable input is logged and treated exactly like absent input.
pub fn parse_decimal_opt(value: Option<&str>) -> Option<BigDecimal> {
    let text = value?.trim();
    if text.is_empty() {
        return None;
    }

    match BigDecimal::from_str(text) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Ignoring unparseable decimal {:?}: {}", text, e);
            None
        },
    }
}

/// Parse an optional decimal string, defaulting to zero.
///
/// # Example
/// ```ignore
/// assert_eq!(parse_decimal(Some("1.5")), BigDecimal::from_str("1.5").unwrap());
/// assert!(parse_decimal(None).is_zero());
/// ```
pub fn parse_decimal(value: Option<&str>) -> BigDecimal {
    parse_decimal_opt(value).unwrap_or_else(BigDecimal::zero)
}

/// Serde adapter for optional decimal fields.
///
/// Accepts a JSON string (`"12.5"`), a JSON number (`12.5`, converted through
/// its decimal text) or `null`/missing. Anything else deserializes to `None`.
pub fn deserialize_opt_decimal<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(match value {
        Some(Value::String(text)) => parse_decimal_opt(Some(&text)),
        Some(Value::Number(number)) => parse_decimal_opt(Some(&number.to_string())),
        _ => None,
    })
}

// ============================================
// Guards
// ============================================

/// The shared "absent means zero" rule used by every valuation path.
#[inline]
pub fn or_zero(value: Option<&BigDecimal>) -> BigDecimal {
    value.cloned().unwrap_or_else(BigDecimal::zero)
}

/// Returns the value only when it is present and strictly positive.
#[inline]
pub fn positive(value: Option<&BigDecimal>) -> Option<&BigDecimal> {
    value.filter(|v| v.is_positive())
}

/// Divide, substituting zero unless the denominator is strictly positive.
pub fn guarded_div(numerator: &BigDecimal, denominator: &BigDecimal) -> BigDecimal {
    if denominator.is_positive() {
        numerator / denominator
    } else {
        BigDecimal::zero()
    }
}

/// `1 / value`, or zero when the value is absent, zero or negative.
pub fn guarded_inverse(value: Option<&BigDecimal>) -> BigDecimal {
    match positive(value) {
        Some(v) => guarded_div(&BigDecimal::one(), v),
        None => BigDecimal::zero(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_absent_and_empty_is_zero() {
        assert!(parse_decimal(None).is_zero());
        assert!(parse_decimal(Some("")).is_zero());
        assert!(parse_decimal(Some("   ")).is_zero());
    }

    #[test]
    fn test_parse_garbage_is_zero() {
        assert!(parse_decimal(Some("not-a-number")).is_zero());
        assert_eq!(parse_decimal_opt(Some("NaN")), None);
    }

    #[test]
    fn test_parse_keeps_full_precision() {
        let raw = "123456789012345678901234567890.000000000000000001";
        assert_eq!(parse_decimal(Some(raw)), dec(raw));
    }

    #[test]
    fn test_guarded_div_by_zero_is_zero() {
        assert!(guarded_div(&dec("10"), &BigDecimal::zero()).is_zero());
        assert!(guarded_div(&dec("10"), &dec("-2")).is_zero());
        assert_eq!(guarded_div(&dec("10"), &dec("4")), dec("2.5"));
    }

    #[test]
    fn test_guarded_inverse() {
        assert_eq!(guarded_inverse(Some(&dec("2.0"))), dec("0.5"));
        assert!(guarded_inverse(Some(&BigDecimal::zero())).is_zero());
        assert!(guarded_inverse(None).is_zero());
    }

    #[test]
    fn test_deserialize_string_number_and_null() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "deserialize_opt_decimal")]
            amount: Option<BigDecimal>,
        }

        let row: Row = serde_json::from_str(r#"{"amount":"42.10"}"#).unwrap();
        assert_eq!(row.amount, Some(dec("42.1")));

        let row: Row = serde_json::from_str(r#"{"amount":0.158}"#).unwrap();
        assert_eq!(row.amount, Some(dec("0.158")));

        let row: Row = serde_json::from_str(r#"{"amount":null}"#).unwrap();
        assert_eq!(row.amount, None);

        let row: Row = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(row.amount, None);
    }
}
