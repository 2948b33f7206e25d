pub mod config;
pub mod cron;
pub mod models;
pub mod pricing;
pub mod sources;
pub mod state;
pub mod utils;

pub use config::Settings;
pub use cron::{Cadence, RefreshScheduler, SchedulerHandle};
pub use pricing::SnapshotView;
pub use sources::FileSource;
pub use state::Store;
