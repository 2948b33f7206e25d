mod clock;
mod scheduler;

pub use clock::{BlockGate, Cadence, RefreshClock};
pub use scheduler::{RefreshAction, RefreshContext, RefreshScheduler, SchedulerHandle};
