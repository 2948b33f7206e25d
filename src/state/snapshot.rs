use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::models::{PoolCollection, PoolRecord, PriceFeed};

/// Chain head as last reported by the chain-head cadence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockState {
    /// Latest block seen; never decreases
    pub current: u64,
    /// First block seen by this process, 0 until then
    pub initial: u64,
}

/// Immutable view of everything the store holds at one commit.
///
/// Collections are behind `Arc` so a commit that touches one field group
/// shares the others with the previous snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Incremented on every commit
    pub version: u64,
    pub committed_at: DateTime<Utc>,
    pub account: Option<String>,
    pub farms: Arc<Vec<PoolRecord>>,
    pub pools: Arc<Vec<PoolRecord>>,
    pub maximus: Arc<Vec<PoolRecord>>,
    /// `None` until the first price-feed fetch lands
    pub prices: Option<Arc<PriceFeed>>,
    pub block: BlockState,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: 0,
            committed_at: Utc::now(),
            account: None,
            farms: Arc::default(),
            pools: Arc::default(),
            maximus: Arc::default(),
            prices: None,
            block: BlockState::default(),
        }
    }
}

impl Snapshot {
    pub fn collection(&self, collection: PoolCollection) -> &[PoolRecord] {
        match collection {
            PoolCollection::Farms => &self.farms,
            PoolCollection::Pools => &self.pools,
            PoolCollection::Maximus => &self.maximus,
        }
    }

    pub(crate) fn collection_mut(&mut self, collection: PoolCollection) -> &mut Arc<Vec<PoolRecord>> {
        match collection {
            PoolCollection::Farms => &mut self.farms,
            PoolCollection::Pools => &mut self.pools,
            PoolCollection::Maximus => &mut self.maximus,
        }
    }
}
