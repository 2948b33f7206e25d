//! Cross-rate USD pricing through pivot pools.
//!
//! A token without a direct USD quote is priced by walking a fixed chain of
//! pools, each contributing its `token_price_vs_quote`:
//!
//! ```text
//! pid 1: AVAX priced in USDT  -> invert   -> USD per AVAX
//! pid 4: LYD  priced in AVAX  -> multiply -> USD per LYD
//! ```
//!
//! A missing pool or a zero/absent price anywhere in the chain makes the
//! whole result zero.

use bigdecimal::BigDecimal;
use num_traits::{One, Zero};

use super::registry::find_by_pid;
use crate::{
    config::PricingSettings,
    models::{PoolRecord, QuoteToken},
    utils::{guarded_div, positive},
};

/// How one hop folds its pool price into the running rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopOp {
    /// rate / token_price_vs_quote
    Invert,
    /// rate * token_price_vs_quote
    Multiply,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotHop {
    pub pid: u64,
    pub op: HopOp,
}

impl PivotHop {
    pub fn invert(pid: u64) -> Self {
        Self { pid, op: HopOp::Invert }
    }

    pub fn multiply(pid: u64) -> Self {
        Self { pid, op: HopOp::Multiply }
    }
}

/// Ordered hops starting from a rate of 1 and ending in USD.
///
/// An empty chain prices at exactly 1 (the token already is USD).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotChain {
    hops: Vec<PivotHop>,
}

impl PivotChain {
    pub fn new(hops: Vec<PivotHop>) -> Self {
        Self { hops }
    }

    pub fn hops(&self) -> &[PivotHop] {
        &self.hops
    }

    /// Walk the chain over the given farms.
    pub fn derive(&self, farms: &[PoolRecord]) -> BigDecimal {
        let mut rate = BigDecimal::one();

        for hop in &self.hops {
            let price = find_by_pid(farms, hop.pid)
                .and_then(|pool| positive(pool.token_price_vs_quote.as_ref()));

            let Some(price) = price else {
                return BigDecimal::zero();
            };

            rate = match hop.op {
                HopOp::Invert => guarded_div(&rate, price),
                HopOp::Multiply => rate * price,
            };
        }

        rate
    }
}

/// Pivot chains for every supported quote token.
#[derive(Debug, Clone)]
pub struct CrossRates {
    stable: PivotChain,
    native: PivotChain,
    governance: PivotChain,
}

impl CrossRates {
    pub fn new(pricing: &PricingSettings) -> Self {
        Self {
            stable: PivotChain::default(),
            native: PivotChain::new(vec![PivotHop::invert(pricing.native_pivot_pid)]),
            governance: PivotChain::new(vec![
                PivotHop::invert(pricing.native_pivot_pid),
                PivotHop::multiply(pricing.governance_pivot_pid),
            ]),
        }
    }

    pub fn chain(&self, quote: QuoteToken) -> &PivotChain {
        match quote {
            QuoteToken::Stable => &self.stable,
            QuoteToken::Native => &self.native,
            QuoteToken::Governance => &self.governance,
        }
    }

    /// USD price of a quote token, zero when a pivot pool is not available.
    pub fn usd_price(&self, quote: QuoteToken, farms: &[PoolRecord]) -> BigDecimal {
        self.chain(quote).derive(farms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn pivots(avax_usdt: Option<&str>, lyd_avax: Option<&str>) -> Vec<PoolRecord> {
        let mut farms = Vec::new();
        if let Some(price) = avax_usdt {
            farms.push(serde_json::json!({
                "pid": 1, "lpSymbol": "AVAX-USDT LP", "quoteTokenSymbol": "USDT",
                "tokenPriceVsQuote": price,
            }));
        }
        if let Some(price) = lyd_avax {
            farms.push(serde_json::json!({
                "pid": 4, "lpSymbol": "LYD-AVAX LP", "quoteTokenSymbol": "AVAX",
                "tokenPriceVsQuote": price,
            }));
        }
        serde_json::from_value(serde_json::Value::Array(farms)).unwrap()
    }

    #[test]
    fn test_governance_price_through_native_pivot() {
        let farms = pivots(Some("2.0"), Some("0.05"));
        let rates = CrossRates::new(&PricingSettings::default());

        assert_eq!(rates.usd_price(QuoteToken::Native, &farms), dec("0.5"));
        assert_eq!(rates.usd_price(QuoteToken::Governance, &farms), dec("0.025"));
    }

    #[test]
    fn test_chain_equals_inverse_times_product() {
        let farms = pivots(Some("8"), Some("3.5"));
        let rates = CrossRates::new(&PricingSettings::default());

        let expected = (BigDecimal::one() / dec("8")) * dec("3.5");
        assert_eq!(rates.usd_price(QuoteToken::Governance, &farms), expected);
    }

    #[test]
    fn test_missing_pivot_pool_is_zero() {
        let rates = CrossRates::new(&PricingSettings::default());

        assert!(rates.usd_price(QuoteToken::Governance, &pivots(None, Some("0.05"))).is_zero());
        assert!(rates.usd_price(QuoteToken::Governance, &pivots(Some("2.0"), None)).is_zero());
        assert!(rates.usd_price(QuoteToken::Native, &[]).is_zero());
    }

    #[test]
    fn test_zero_or_absent_price_is_zero() {
        let rates = CrossRates::new(&PricingSettings::default());

        assert!(rates.usd_price(QuoteToken::Native, &pivots(Some("0"), None)).is_zero());

        let farms: Vec<PoolRecord> =
            serde_json::from_value(serde_json::json!([{ "pid": 1 }, { "pid": 4, "tokenPriceVsQuote": "1" }]))
                .unwrap();
        assert!(rates.usd_price(QuoteToken::Governance, &farms).is_zero());
    }

    #[test]
    fn test_stable_quote_is_one_without_pools() {
        let rates = CrossRates::new(&PricingSettings::default());
        assert_eq!(rates.usd_price(QuoteToken::Stable, &[]), BigDecimal::one());
    }

    #[test]
    fn test_custom_chain_order() {
        let farms = pivots(Some("4"), Some("2"));
        let chain = PivotChain::new(vec![PivotHop::multiply(4), PivotHop::invert(1)]);
        assert_eq!(chain.derive(&farms), dec("0.5"));
        assert_eq!(chain.hops().len(), 2);
    }
}
