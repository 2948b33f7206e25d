use bigdecimal::BigDecimal;
use num_traits::{Signed, Zero};
use rustc_hash::FxHashMap;
use std::sync::Arc;

use super::{
    cross_rate::CrossRates,
    registry::{find_by_pid, find_by_symbol},
    valuator::value_position,
};
use crate::{
    config::PricingSettings,
    models::{price_override, PoolCollection, PoolRecord, QuoteToken, ValuationRecord},
    state::{BlockState, Snapshot},
};

/// Read-only derived views over one store snapshot.
///
/// Resolution priority for [`SnapshotView::derived_usd_price`]:
/// 1. Fixed override table
/// 2. On-chain pivot chain (stable, native, governance tokens)
/// 3. Off-chain price feed
/// 4. Zero
///
/// Prices resolved through this view are memoized for its lifetime only.
/// A view never sees later commits; build a new one from the store to read
/// fresh state. Nothing here triggers a fetch.
pub struct SnapshotView {
    snapshot: Arc<Snapshot>,
    pricing: PricingSettings,
    rates: CrossRates,
    /// Quote-token prices resolved in this view
    quote_prices: FxHashMap<QuoteToken, BigDecimal>,
    /// Symbol prices resolved in this view
    usd_prices: FxHashMap<String, BigDecimal>,
}

impl SnapshotView {
    pub fn new(snapshot: Arc<Snapshot>, pricing: &PricingSettings) -> Self {
        Self {
            snapshot,
            pricing: pricing.clone(),
            rates: CrossRates::new(pricing),
            quote_prices: FxHashMap::default(),
            usd_prices: FxHashMap::default(),
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn version(&self) -> u64 {
        self.snapshot.version
    }

    pub fn block(&self) -> BlockState {
        self.snapshot.block
    }

    pub fn pool_by_id(&self, collection: PoolCollection, id: u64) -> Option<&PoolRecord> {
        find_by_pid(self.snapshot.collection(collection), id)
    }

    pub fn pool_by_symbol(&self, collection: PoolCollection, symbol: &str) -> Option<&PoolRecord> {
        find_by_symbol(self.snapshot.collection(collection), symbol)
    }

    fn quote_token_price(&mut self, quote: QuoteToken) -> BigDecimal {
        if let Some(price) = self.quote_prices.get(&quote) {
            return price.clone();
        }

        let price = self.rates.usd_price(quote, &self.snapshot.farms);
        self.quote_prices.insert(quote, price.clone());
        price
    }

    /// USD price of a pool's quote token, zero for unrecognized symbols.
    pub fn quote_price_usd(&mut self, quote_token_symbol: &str) -> BigDecimal {
        match QuoteToken::resolve(quote_token_symbol, &self.pricing) {
            Some(quote) => self.quote_token_price(quote),
            None => BigDecimal::zero(),
        }
    }

    pub fn native_price_usd(&mut self) -> BigDecimal {
        self.quote_token_price(QuoteToken::Native)
    }

    pub fn governance_price_usd(&mut self) -> BigDecimal {
        self.quote_token_price(QuoteToken::Governance)
    }

    /// Price-feed quote with the override applied; `None` before the first feed.
    pub fn api_price(&self, symbol: &str) -> Option<BigDecimal> {
        self.snapshot
            .prices
            .as_ref()
            .and_then(|feed| feed.quote(symbol))
            .cloned()
    }

    /// Best USD price for a symbol, zero when undeterminable.
    pub fn derived_usd_price(&mut self, symbol: &str) -> BigDecimal {
        let symbol = symbol.to_lowercase();

        if let Some(price) = price_override(&symbol) {
            return price.clone();
        }

        if let Some(price) = self.usd_prices.get(&symbol) {
            return price.clone();
        }

        let on_chain = self.quote_price_usd(&symbol);
        let price = if on_chain.is_positive() {
            on_chain
        } else {
            self.snapshot
                .prices
                .as_ref()
                .and_then(|feed| feed.get(&symbol))
                .cloned()
                .unwrap_or_else(BigDecimal::zero)
        };

        self.usd_prices.insert(symbol, price.clone());
        price
    }

    /// Valuation of the user's position in one pool, zero-filled when the pool
    /// or its position is absent.
    pub fn position_valuation(&mut self, collection: PoolCollection, id: u64) -> ValuationRecord {
        let snapshot = Arc::clone(&self.snapshot);
        let pool = find_by_pid(snapshot.collection(collection), id);
        self.value(pool)
    }

    /// Valuations for every pool of a collection, in collection order.
    pub fn valuations(&mut self, collection: PoolCollection) -> Vec<ValuationRecord> {
        let snapshot = Arc::clone(&self.snapshot);
        snapshot
            .collection(collection)
            .iter()
            .map(|pool| self.value(Some(pool)))
            .collect()
    }

    /// Sum of `staked_usd` over a collection. Pools with an unrecognized quote
    /// token contribute zero.
    pub fn total_staked_usd(&mut self, collection: PoolCollection) -> BigDecimal {
        self.valuations(collection)
            .into_iter()
            .fold(BigDecimal::zero(), |total, v| total + v.staked_usd)
    }

    fn value(&mut self, pool: Option<&PoolRecord>) -> ValuationRecord {
        let quote_price = match pool {
            Some(p) => self.quote_price_usd(&p.quote_token_symbol),
            None => BigDecimal::zero(),
        };
        value_position(pool, &quote_price)
    }
}
