use chrono::Utc;
use log::{debug, info};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::watch;

use crate::models::{PoolCollection, PoolRecord, PriceFeed, UserPositionEntry};

use super::Snapshot;

/// Process-wide holder of pool, price, block and account state.
///
/// Readers take an `Arc<Snapshot>` and never see a partial commit. Writers are
/// fetch-completion handlers: each commit clones the current snapshot, applies
/// one field group and swaps the result in. Concurrent commits of the same
/// group resolve last-write-wins.
pub struct Store {
    current: RwLock<Arc<Snapshot>>,
    account_tx: watch::Sender<Option<String>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let (account_tx, _) = watch::channel(None);
        Self {
            current: RwLock::new(Arc::new(Snapshot::default())),
            account_tx,
        }
    }

    /// Latest committed snapshot (pointer clone only).
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.read().clone()
    }

    /// Receiver notified on every account change.
    pub fn subscribe_account(&self) -> watch::Receiver<Option<String>> {
        self.account_tx.subscribe()
    }

    /// Switch the tracked wallet account.
    ///
    /// A change wipes user data from every collection; positions of the
    /// previous account are never merged into the new one. Setting the same
    /// account again is a no-op and does not notify subscribers.
    pub fn set_account(&self, account: Option<String>) -> bool {
        self.commit(|snapshot| {
            if snapshot.account == account {
                return false;
            }

            for collection in PoolCollection::ALL {
                let cleared: Vec<PoolRecord> = snapshot
                    .collection(collection)
                    .iter()
                    .cloned()
                    .map(|mut record| {
                        record.user_data = None;
                        record
                    })
                    .collect();
                *snapshot.collection_mut(collection) = Arc::new(cleared);
            }

            match &account {
                Some(a) => info!("Account switched to {}, user data invalidated", a),
                None => info!("Account disconnected, user data invalidated"),
            }

            snapshot.account = account.clone();
            self.account_tx.send_replace(account);
            true
        })
    }

    /// Replace the public data of one collection.
    ///
    /// User positions already attached to a pool survive the replacement; any
    /// `user_data` carried by the incoming records is ignored.
    pub fn commit_public_data(&self, collection: PoolCollection, records: Vec<PoolRecord>) -> bool {
        self.commit(|snapshot| {
            let previous = snapshot.collection(collection);
            let merged: Vec<PoolRecord> = records
                .into_iter()
                .map(|mut record| {
                    record.user_data = previous
                        .iter()
                        .find(|p| p.id == record.id)
                        .and_then(|p| p.user_data.clone());
                    record
                })
                .collect();

            debug!(
                "Committed {} public records for {}",
                merged.len(),
                collection.as_str()
            );
            *snapshot.collection_mut(collection) = Arc::new(merged);
            true
        })
    }

    /// Replace the user positions of one collection with a fetch for `account`.
    ///
    /// The response is the whole position set: pools it does not mention lose
    /// their previous position. Dropped when `account` is no longer the
    /// tracked account (a response that landed after an account switch).
    /// Entries for pools that have no public record yet are skipped.
    pub fn commit_user_data(
        &self,
        collection: PoolCollection,
        account: &str,
        entries: Vec<UserPositionEntry>,
    ) -> bool {
        self.commit(|snapshot| {
            let is_current = snapshot
                .account
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(account));
            if !is_current {
                debug!(
                    "Dropping {} user data for stale account {}",
                    collection.as_str(),
                    account
                );
                return false;
            }

            let mut records = snapshot.collection(collection).to_vec();
            for record in records.iter_mut() {
                record.user_data = None;
            }
            for entry in entries {
                match records.iter_mut().find(|r| r.id == entry.id) {
                    Some(record) => record.user_data = Some(entry.position),
                    None => debug!(
                        "Skipping user data for unknown {} pool {}",
                        collection.as_str(),
                        entry.id
                    ),
                }
            }

            *snapshot.collection_mut(collection) = Arc::new(records);
            true
        })
    }

    pub fn commit_prices(&self, feed: PriceFeed) -> bool {
        self.commit(|snapshot| {
            debug!("Committed price feed with {} symbols", feed.len());
            snapshot.prices = Some(Arc::new(feed));
            true
        })
    }

    /// Record a new chain head. Blocks at or below the current one are ignored.
    pub fn commit_block(&self, block: u64) -> bool {
        self.commit(|snapshot| {
            if block <= snapshot.block.current {
                return false;
            }
            if snapshot.block.initial == 0 {
                snapshot.block.initial = block;
            }
            snapshot.block.current = block;
            true
        })
    }

    /// Apply `mutate` to a copy of the current snapshot and publish it.
    ///
    /// `mutate` returns false to abandon the commit; the version only moves
    /// when something was published.
    fn commit<F>(&self, mutate: F) -> bool
    where
        F: FnOnce(&mut Snapshot) -> bool,
    {
        let mut current = self.current.write();
        let mut next = Snapshot::clone(&current);

        if !mutate(&mut next) {
            return false;
        }

        next.version = current.version + 1;
        next.committed_at = Utc::now();
        *current = Arc::new(next);
        true
    }
}
