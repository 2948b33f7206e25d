use bigdecimal::BigDecimal;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::str::FromStr;

use crate::utils::parse_decimal_opt;

/// Fixed manual price overrides, applied on every read.
///
/// `olive` is pinned for the Olive electrum pool, whose feed quote is unusable.
/// This is a known workaround kept as a single entry; it is not a general
/// override mechanism.
static PRICE_OVERRIDES: Lazy<[(&'static str, BigDecimal); 1]> = Lazy::new(|| {
    [(
        "olive",
        BigDecimal::from_str("0.158").unwrap_or_default(),
    )]
});

/// Look up the fixed override for a (lowercase) symbol.
pub fn price_override(symbol: &str) -> Option<&'static BigDecimal> {
    PRICE_OVERRIDES
        .iter()
        .find(|(s, _)| *s == symbol)
        .map(|(_, price)| price)
}

/// USD prices from the off-chain price API, keyed by lowercase symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceFeed {
    prices: FxHashMap<String, BigDecimal>,
}

impl PriceFeed {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, BigDecimal)>,
        S: AsRef<str>,
    {
        Self {
            prices: entries
                .into_iter()
                .map(|(symbol, price)| (symbol.as_ref().to_lowercase(), price))
                .collect(),
        }
    }

    /// Build a feed from the API's JSON body.
    ///
    /// Accepts either a flat `{ "symbol": price }` object or one wrapping it in
    /// `prices`/`data`. Prices may be strings or numbers; entries that do not
    /// parse as decimals are skipped.
    pub fn from_json(value: &Value) -> Self {
        let map = match value {
            Value::Object(map) => match map.get("prices").or_else(|| map.get("data")) {
                Some(Value::Object(inner)) => inner,
                _ => map,
            },
            _ => return Self::default(),
        };

        let entries = map.iter().filter_map(|(symbol, price)| {
            let parsed = match price {
                Value::String(text) => parse_decimal_opt(Some(text)),
                Value::Number(number) => parse_decimal_opt(Some(&number.to_string())),
                _ => None,
            }?;
            Some((symbol.as_str(), parsed))
        });

        Self::new(entries)
    }

    /// Raw feed value, without the override applied.
    pub fn get(&self, symbol: &str) -> Option<&BigDecimal> {
        self.prices.get(&symbol.to_lowercase())
    }

    /// Feed value with the fixed override applied.
    pub fn quote(&self, symbol: &str) -> Option<&BigDecimal> {
        let symbol = symbol.to_lowercase();
        price_override(&symbol).or_else(|| self.prices.get(&symbol))
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_flat_and_wrapped() {
        let flat = PriceFeed::from_json(&serde_json::json!({ "AVAX": "12.5", "lyd": 0.02 }));
        assert_eq!(flat.get("avax"), Some(&BigDecimal::from_str("12.5").unwrap()));
        assert_eq!(flat.get("LYD"), Some(&BigDecimal::from_str("0.02").unwrap()));

        let wrapped = PriceFeed::from_json(&serde_json::json!({
            "update_at": "2021-06-01",
            "prices": { "png": "1.1" },
        }));
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped.get("png"), Some(&BigDecimal::from_str("1.1").unwrap()));
    }

    #[test]
    fn test_from_json_skips_bad_entries() {
        let feed = PriceFeed::from_json(&serde_json::json!({ "a": "x", "b": null, "c": "3" }));
        assert_eq!(feed.len(), 1);
        assert!(PriceFeed::from_json(&serde_json::json!([1, 2])).is_empty());
    }

    #[test]
    fn test_override_wins_over_feed() {
        let feed = PriceFeed::new([("olive", BigDecimal::from(9)), ("avax", BigDecimal::from(20))]);
        assert_eq!(feed.quote("OLIVE"), Some(&BigDecimal::from_str("0.158").unwrap()));
        assert_eq!(feed.get("olive"), Some(&BigDecimal::from(9)));
        assert_eq!(feed.quote("avax"), Some(&BigDecimal::from(20)));
        assert_eq!(feed.quote("missing"), None);
    }
}
