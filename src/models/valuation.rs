use bigdecimal::BigDecimal;
use num_traits::Zero;
use serde::Serialize;

use super::PoolRecord;

/// USD-denominated view of a user's position in one pool.
///
/// Carries a copy of the pool's public fields (`None` when the pool has not
/// been fetched yet) next to the decimal-normalized position fields. Built by
/// the position valuator; never written back into the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRecord {
    pub pool: Option<PoolRecord>,
    pub staked_balance: BigDecimal,
    pub allowance: BigDecimal,
    pub token_balance: BigDecimal,
    pub earnings: BigDecimal,
    pub pending_reward: BigDecimal,
    pub staked_in_quote_token: BigDecimal,
    pub staked_usd: BigDecimal,
}

impl ValuationRecord {
    /// All-zero valuation for an absent pool.
    pub fn zeroed() -> Self {
        Self {
            pool: None,
            staked_balance: BigDecimal::zero(),
            allowance: BigDecimal::zero(),
            token_balance: BigDecimal::zero(),
            earnings: BigDecimal::zero(),
            pending_reward: BigDecimal::zero(),
            staked_in_quote_token: BigDecimal::zero(),
            staked_usd: BigDecimal::zero(),
        }
    }
}
