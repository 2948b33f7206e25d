//! Shared store of fetched state.
//!
//! The store is the only mutable structure in the crate. Derivation code reads
//! [`Snapshot`]s; fetch-completion handlers write through [`Store`] or a
//! [`StoreSink`].

mod sink;
mod snapshot;
mod store;

pub use sink::StoreSink;
pub use snapshot::{BlockState, Snapshot};
pub use store::Store;
