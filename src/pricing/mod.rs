//! USD derivation over store snapshots.
//!
//! - [`registry`] - pool lookups by id and symbol
//! - [`cross_rate`] - pivot-chain pricing for tokens without a USD quote
//! - [`valuator`] - staked/pending/allowance balances to USD figures
//! - [`selectors`] - the read-only views handed to presentation code

pub mod cross_rate;
pub mod registry;
pub mod selectors;
pub mod valuator;

pub use cross_rate::{CrossRates, HopOp, PivotChain, PivotHop};
pub use registry::{find_by_pid, find_by_symbol};
pub use selectors::SnapshotView;
pub use valuator::{staked_in_quote_token, value_position};
