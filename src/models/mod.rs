//! Raw records delivered by fetches and the derived records built from them.

mod pool;
mod price_feed;
mod valuation;

pub use pool::{PoolCollection, PoolRecord, QuoteToken, UserPosition, UserPositionEntry};
pub use price_feed::{price_override, PriceFeed};
pub use valuation::ValuationRecord;
