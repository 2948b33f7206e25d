//! Position valuation.
//!
//! `staked_in_quote = staked_balance / lp_token_balance_mc * lp_total_in_quote_token`
//! `staked_usd      = staked_in_quote * quote_price_usd`
//!
//! The quote price is resolved by the caller (see [`super::SnapshotView`]);
//! this module only does the arithmetic and the zero substitution.

use bigdecimal::BigDecimal;
use num_traits::Zero;

use crate::{
    models::{PoolRecord, UserPosition, ValuationRecord},
    utils::{guarded_div, or_zero},
};

/// The user's staked LP amount expressed in the pool's quote token.
///
/// Zero when the pool is absent, has no user data, or the staking contract
/// holds no LP tokens.
pub fn staked_in_quote_token(pool: Option<&PoolRecord>) -> BigDecimal {
    let Some(pool) = pool else {
        return BigDecimal::zero();
    };

    let staked = or_zero(
        pool.user_data
            .as_ref()
            .and_then(|u| u.staked_balance.as_ref()),
    );
    let lp_in_contract = or_zero(pool.lp_token_balance_mc.as_ref());
    let lp_total_in_quote = or_zero(pool.lp_total_in_quote_token.as_ref());

    guarded_div(&staked, &lp_in_contract) * lp_total_in_quote
}

/// Value a pool's user position at the given quote-token USD price.
///
/// Returns [`ValuationRecord::zeroed`] for an absent pool. The pool record is
/// copied into the result, never modified.
pub fn value_position(pool: Option<&PoolRecord>, quote_price_usd: &BigDecimal) -> ValuationRecord {
    let Some(record) = pool else {
        return ValuationRecord::zeroed();
    };

    let position = record.user_data.clone().unwrap_or_default();
    let UserPosition {
        staked_balance,
        allowance,
        token_balance,
        earnings,
        pending_reward,
    } = &position;

    let staked_in_quote = staked_in_quote_token(pool);
    let staked_usd = &staked_in_quote * quote_price_usd;

    ValuationRecord {
        pool: Some(record.clone()),
        staked_balance: or_zero(staked_balance.as_ref()),
        allowance: or_zero(allowance.as_ref()),
        token_balance: or_zero(token_balance.as_ref()),
        earnings: or_zero(earnings.as_ref()),
        pending_reward: or_zero(pending_reward.as_ref()),
        staked_in_quote_token: staked_in_quote,
        staked_usd,
    }
}
