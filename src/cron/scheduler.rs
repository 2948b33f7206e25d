//! Refresh scheduler for the periodic fetch-and-derive cycle.
//!
//! Runs three independent cadences:
//! - Slow: public pool data and the price feed, regardless of wallet state
//! - Fast: user positions, only while an account is connected
//! - Chain head: current block number
//!
//! Each tick spawns every registered action and moves on; ticks follow the
//! wall clock, not fetch completion, so two fetches of the same cadence may be
//! in flight at once.

use std::{future::Future, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use log::{debug, info};
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::RefreshSettings,
    state::{Store, StoreSink},
};

use super::clock::{Cadence, RefreshClock};

/// A registered fetch action. Called once per dispatch; the returned future is
/// spawned and never awaited by the scheduler.
pub type RefreshAction = Arc<dyn Fn(RefreshContext) -> BoxFuture<'static, ()> + Send + Sync>;

/// What a refresh action gets to work with.
#[derive(Clone)]
pub struct RefreshContext {
    pub cadence: Cadence,
    /// Cadence tick this dispatch belongs to
    pub tick: u64,
    /// Tracked account at dispatch time
    pub account: Option<String>,
    /// Latest committed block at dispatch time
    pub block: u64,
    /// Commit handle, closed once the dispatching handle is stopped
    pub sink: StoreSink,
}

fn boxed<F, Fut>(action: F) -> RefreshAction
where
    F: Fn(RefreshContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |ctx| -> BoxFuture<'static, ()> { Box::pin(action(ctx)) })
}

/// Scheduler that owns the registered actions for each cadence.
///
/// Register actions first, then [`RefreshScheduler::start`] against a store.
/// Each start arms its own timers and returns the handle that tears them down.
pub struct RefreshScheduler {
    settings: RefreshSettings,
    fast: Vec<RefreshAction>,
    slow: Vec<RefreshAction>,
    chain_head: Vec<RefreshAction>,
    clock: Arc<RefreshClock>,
}

impl RefreshScheduler {
    pub fn new(settings: RefreshSettings) -> Self {
        Self {
            settings,
            fast: Vec::new(),
            slow: Vec::new(),
            chain_head: Vec::new(),
            clock: Arc::new(RefreshClock::default()),
        }
    }

    pub fn register_fast_refresh<F, Fut>(&mut self, action: F)
    where
        F: Fn(RefreshContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.fast.push(boxed(action));
    }

    pub fn register_slow_refresh<F, Fut>(&mut self, action: F)
    where
        F: Fn(RefreshContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.slow.push(boxed(action));
    }

    pub fn register_chain_head_refresh<F, Fut>(&mut self, action: F)
    where
        F: Fn(RefreshContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.chain_head.push(boxed(action));
    }

    pub fn clock(&self) -> Arc<RefreshClock> {
        self.clock.clone()
    }

    /// Arm all cadence timers and the account watcher.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, store: Arc<Store>) -> SchedulerHandle {
        let token = CancellationToken::new();
        let dispatcher = Dispatcher {
            store: store.clone(),
            clock: self.clock.clone(),
            token: token.clone(),
        };

        let cadences = [
            (Cadence::Slow, self.settings.slow_interval_ms, &self.slow),
            (Cadence::Fast, self.settings.fast_interval_ms, &self.fast),
            (
                Cadence::ChainHead,
                self.settings.chain_head_interval_ms,
                &self.chain_head,
            ),
        ];

        let mut tasks = Vec::with_capacity(cadences.len() + 1);
        for (cadence, interval_ms, actions) in cadences {
            let period = Duration::from_millis(interval_ms.max(1));
            let actions: Arc<[RefreshAction]> = Arc::from(actions.as_slice());
            let dispatcher = dispatcher.clone();

            info!(
                "Armed {} refresh (every {}ms, {} actions)",
                cadence,
                period.as_millis(),
                actions.len()
            );
            tasks.push(tokio::spawn(run_cadence(dispatcher, cadence, period, actions)));
        }

        let account_rx = store.subscribe_account();
        let fast: Arc<[RefreshAction]> = Arc::from(self.fast.as_slice());
        tasks.push(tokio::spawn(watch_account(dispatcher, account_rx, fast)));

        SchedulerHandle { token, tasks }
    }
}

/// Shared state of one started scheduler.
#[derive(Clone)]
struct Dispatcher {
    store: Arc<Store>,
    clock: Arc<RefreshClock>,
    token: CancellationToken,
}

impl Dispatcher {
    /// Spawn every action of a cadence. Fast dispatches are skipped while no
    /// account is connected. Returns the number of actions spawned.
    fn dispatch(&self, cadence: Cadence, tick: u64, actions: &[RefreshAction]) -> usize {
        let snapshot = self.store.snapshot();

        if cadence == Cadence::Fast && snapshot.account.is_none() {
            debug!("Skipping fast refresh #{}: no account connected", tick);
            return 0;
        }

        let ctx = RefreshContext {
            cadence,
            tick,
            account: snapshot.account.clone(),
            block: snapshot.block.current,
            sink: StoreSink::new(&self.store, self.token.clone()),
        };

        for action in actions {
            tokio::spawn(action(ctx.clone()));
        }

        debug!(
            "Dispatched {} {} refresh actions (tick #{})",
            actions.len(),
            cadence,
            tick
        );
        actions.len()
    }
}

async fn run_cadence(
    dispatcher: Dispatcher,
    cadence: Cadence,
    period: Duration,
    actions: Arc<[RefreshAction]>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = dispatcher.token.cancelled() => break,
            _ = ticker.tick() => {
                let tick = dispatcher.clock.advance(cadence);
                dispatcher.dispatch(cadence, tick, &actions);
            }
        }
    }

    debug!("{} refresh stopped", cadence);
}

/// Dispatch one out-of-band fast refresh whenever a new account connects.
async fn watch_account(
    dispatcher: Dispatcher,
    mut account_rx: watch::Receiver<Option<String>>,
    fast: Arc<[RefreshAction]>,
) {
    loop {
        tokio::select! {
            _ = dispatcher.token.cancelled() => break,
            changed = account_rx.changed() => {
                if changed.is_err() {
                    break;
                }

                let account = account_rx.borrow_and_update().clone();
                match account {
                    Some(account) => {
                        info!("Account {} connected, refreshing user data now", account);
                        let tick = dispatcher.clock.ticks(Cadence::Fast);
                        dispatcher.dispatch(Cadence::Fast, tick, &fast);
                    },
                    None => info!("Account disconnected, pausing fast refresh"),
                }
            }
        }
    }
}

/// Teardown handle for one [`RefreshScheduler::start`].
///
/// Stopping cancels exactly the timers this start armed and closes the sinks
/// it handed out; fetches already in flight run to completion but their
/// commits are dropped. Dropping the handle stops it.
pub struct SchedulerHandle {
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Idempotent; safe to call any number of times.
    pub fn stop(&self) {
        if !self.token.is_cancelled() {
            info!("Stopping refresh scheduler...");
            self.token.cancel();
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Stop and wait for the timer tasks to exit.
    pub async fn join(mut self) {
        self.stop();
        for task in std::mem::take(&mut self.tasks) {
            let _ = task.await;
        }
        info!("Refresh scheduler stopped");
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
