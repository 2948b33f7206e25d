//! Pool lookups over one collection.
//!
//! Collections are bounded by the number of configured pools, so a linear
//! scan is all that is needed. A miss is `None`, never an error.

use crate::models::PoolRecord;

pub fn find_by_pid(collection: &[PoolRecord], pid: u64) -> Option<&PoolRecord> {
    collection.iter().find(|pool| pool.id == pid)
}

/// Exact, case-sensitive match on `lp_symbol`.
pub fn find_by_symbol<'a>(collection: &'a [PoolRecord], symbol: &str) -> Option<&'a PoolRecord> {
    collection.iter().find(|pool| pool.lp_symbol == symbol)
}
