use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// The independent refresh intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cadence {
    /// Wallet-scoped user data, only while an account is connected
    Fast,
    /// Market-wide public data
    Slow,
    /// Current block number
    ChainHead,
}

impl fmt::Display for Cadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cadence::Fast => "fast",
            Cadence::Slow => "slow",
            Cadence::ChainHead => "chain-head",
        };
        f.write_str(name)
    }
}

/// Monotonic tick counters, one per cadence.
///
/// Counters advance on wall-clock ticks only; out-of-band dispatches (an
/// account change) do not move them.
#[derive(Debug, Default)]
pub struct RefreshClock {
    fast: AtomicU64,
    slow: AtomicU64,
    chain_head: AtomicU64,
}

impl RefreshClock {
    fn counter(&self, cadence: Cadence) -> &AtomicU64 {
        match cadence {
            Cadence::Fast => &self.fast,
            Cadence::Slow => &self.slow,
            Cadence::ChainHead => &self.chain_head,
        }
    }

    /// Advance a cadence and return its new tick number (first tick is 1).
    pub fn advance(&self, cadence: Cadence) -> u64 {
        self.counter(cadence).fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn ticks(&self, cadence: Cadence) -> u64 {
        self.counter(cadence).load(Ordering::Acquire)
    }
}

/// Change detector over a monotonic signal such as the chain-head tick or
/// the committed block number.
///
/// Lets a fast or slow action skip work when the chain has not moved since
/// its last run.
#[derive(Debug, Default)]
pub struct BlockGate {
    last_seen: Option<u64>,
}

impl BlockGate {
    /// Returns true the first time a value is observed and whenever it
    /// increases afterwards.
    pub fn observe(&mut self, value: u64) -> bool {
        match self.last_seen {
            Some(last) if value <= last => false,
            _ => {
                self.last_seen = Some(value);
                true
            },
        }
    }
}
