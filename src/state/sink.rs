use log::debug;
use std::sync::{Arc, Weak};
use tokio_util::sync::CancellationToken;

use crate::models::{PoolCollection, PoolRecord, PriceFeed, UserPositionEntry};

use super::Store;

/// Commit handle given to refresh actions.
///
/// Tied to the scheduler handle that dispatched the action: once that handle
/// is stopped (or the store is gone) every commit is dropped, so a fetch that
/// completes after teardown cannot write into a disposed consumer.
#[derive(Clone)]
pub struct StoreSink {
    store: Weak<Store>,
    token: CancellationToken,
}

impl StoreSink {
    pub fn new(store: &Arc<Store>, token: CancellationToken) -> Self {
        Self {
            store: Arc::downgrade(store),
            token,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled() || self.store.strong_count() == 0
    }

    fn live(&self, what: &str) -> Option<Arc<Store>> {
        if self.token.is_cancelled() {
            debug!("Dropping late {} commit after teardown", what);
            return None;
        }
        let store = self.store.upgrade();
        if store.is_none() {
            debug!("Dropping {} commit, store is gone", what);
        }
        store
    }

    pub fn commit_public_data(&self, collection: PoolCollection, records: Vec<PoolRecord>) -> bool {
        self.live(collection.as_str())
            .is_some_and(|store| store.commit_public_data(collection, records))
    }

    pub fn commit_user_data(
        &self,
        collection: PoolCollection,
        account: &str,
        entries: Vec<UserPositionEntry>,
    ) -> bool {
        self.live("user data")
            .is_some_and(|store| store.commit_user_data(collection, account, entries))
    }

    pub fn commit_prices(&self, feed: PriceFeed) -> bool {
        self.live("price feed")
            .is_some_and(|store| store.commit_prices(feed))
    }

    pub fn commit_block(&self, block: u64) -> bool {
        self.live("block").is_some_and(|store| store.commit_block(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_sink_drops_commits() {
        let store = Arc::new(Store::new());
        let token = CancellationToken::new();
        let sink = StoreSink::new(&store, token.clone());

        assert!(sink.commit_block(10));
        token.cancel();
        assert!(sink.is_closed());
        assert!(!sink.commit_block(11));
        assert_eq!(store.snapshot().block.current, 10);
    }

    #[test]
    fn test_sink_outliving_store() {
        let store = Arc::new(Store::new());
        let sink = StoreSink::new(&store, CancellationToken::new());
        drop(store);

        assert!(sink.is_closed());
        assert!(!sink.commit_prices(PriceFeed::default()));
    }
}
