//! Data sources feeding fetch results into the store.

mod file;

pub use file::FileSource;
