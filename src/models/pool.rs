use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::{config::PricingSettings, utils::deserialize_opt_decimal};

/// The independently fetched collections that share the [`PoolRecord`] shape.
///
/// - `Farms`: LP farms keyed by `pid`; also hosts the pivot pools used for pricing
/// - `Pools`: single-asset staking pools keyed by `sousId`
/// - `Maximus`: auto-compounding vaults keyed by `pid`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolCollection {
    Farms,
    Pools,
    Maximus,
}

impl PoolCollection {
    pub const ALL: [PoolCollection; 3] = [Self::Farms, Self::Pools, Self::Maximus];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Farms => "farms",
            Self::Pools => "pools",
            Self::Maximus => "maximus",
        }
    }
}

/// The token a pool's primary asset is priced against.
///
/// Raw records carry the quote token as a free-form symbol; [`QuoteToken::resolve`]
/// maps it onto one of the supported kinds using the configured symbols.
/// Anything else is unrecognized and values to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteToken {
    /// USD-pegged stablecoin
    Stable,
    /// The network's native gas token
    Native,
    /// The protocol's governance token
    Governance,
}

impl QuoteToken {
    pub fn resolve(symbol: &str, pricing: &PricingSettings) -> Option<Self> {
        if symbol.eq_ignore_ascii_case(&pricing.stable_symbol) {
            Some(Self::Stable)
        } else if symbol.eq_ignore_ascii_case(&pricing.native_symbol) {
            Some(Self::Native)
        } else if symbol.eq_ignore_ascii_case(&pricing.governance_symbol) {
            Some(Self::Governance)
        } else {
            None
        }
    }
}

/// Wallet-scoped balances for one pool.
///
/// Every field is optional until the first successful user fetch; absent
/// values are read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPosition {
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub staked_balance: Option<BigDecimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub allowance: Option<BigDecimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub token_balance: Option<BigDecimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub earnings: Option<BigDecimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub pending_reward: Option<BigDecimal>,
}

/// One entry of a user-data fetch: the pool identifier plus its position.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UserPositionEntry {
    #[serde(alias = "pid", alias = "sousId")]
    pub id: u64,
    #[serde(flatten)]
    pub position: UserPosition,
}

/// Farm, staking pool or vault state as delivered by the public-data fetch.
///
/// ## Fields:
/// - `token_price_vs_quote`: price of the primary token in its quote token
/// - `lp_token_balance_mc`: LP tokens held by the staking contract (divisor, may be zero)
/// - `lp_total_in_quote_token`: value of that LP position in the quote token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    #[serde(alias = "pid", alias = "sousId")]
    pub id: u64,
    #[serde(default, alias = "tokenName")]
    pub lp_symbol: String,
    #[serde(default)]
    pub quote_token_symbol: String,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub token_price_vs_quote: Option<BigDecimal>,
    #[serde(
        default,
        rename = "lpTokenBalanceMC",
        deserialize_with = "deserialize_opt_decimal"
    )]
    pub lp_token_balance_mc: Option<BigDecimal>,
    #[serde(default, deserialize_with = "deserialize_opt_decimal")]
    pub lp_total_in_quote_token: Option<BigDecimal>,
    #[serde(default)]
    pub user_data: Option<UserPosition>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_farm_record_from_json() {
        let farm: PoolRecord = serde_json::from_value(serde_json::json!({
            "pid": 4,
            "lpSymbol": "LYD-AVAX LP",
            "quoteTokenSymbol": "AVAX",
            "tokenPriceVsQuote": "0.05",
            "lpTokenBalanceMC": "100",
            "lpTotalInQuoteToken": "500",
        }))
        .unwrap();

        assert_eq!(farm.id, 4);
        assert_eq!(farm.lp_symbol, "LYD-AVAX LP");
        assert_eq!(farm.token_price_vs_quote, Some(BigDecimal::from_str("0.05").unwrap()));
        assert_eq!(farm.lp_token_balance_mc, Some(BigDecimal::from(100)));
        assert_eq!(farm.user_data, None);
    }

    #[test]
    fn test_staking_pool_uses_sous_id() {
        let pool: PoolRecord = serde_json::from_value(serde_json::json!({
            "sousId": 7,
            "tokenName": "OLIVE",
            "quoteTokenSymbol": "LYD",
        }))
        .unwrap();

        assert_eq!(pool.id, 7);
        assert_eq!(pool.lp_symbol, "OLIVE");
        assert_eq!(pool.token_price_vs_quote, None);
    }

    #[test]
    fn test_user_entry_flattens_position() {
        let entry: UserPositionEntry = serde_json::from_value(serde_json::json!({
            "pid": 2,
            "stakedBalance": "10",
            "pendingReward": "0.5",
        }))
        .unwrap();

        assert_eq!(entry.id, 2);
        assert_eq!(entry.position.staked_balance, Some(BigDecimal::from(10)));
        assert_eq!(entry.position.allowance, None);
        assert_eq!(
            entry.position.pending_reward,
            Some(BigDecimal::from_str("0.5").unwrap())
        );
    }

    #[test]
    fn test_quote_token_resolution_is_case_insensitive() {
        let pricing = PricingSettings::default();
        assert_eq!(QuoteToken::resolve("AVAX", &pricing), Some(QuoteToken::Native));
        assert_eq!(QuoteToken::resolve("lyd", &pricing), Some(QuoteToken::Governance));
        assert_eq!(QuoteToken::resolve("USDT", &pricing), Some(QuoteToken::Stable));
        assert_eq!(QuoteToken::resolve("ETH", &pricing), None);
    }
}
