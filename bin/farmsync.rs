use std::sync::Arc;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, LevelFilter};
use parking_lot::Mutex;
use simple_logger::SimpleLogger;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use farmsync::{
    cron::{BlockGate, RefreshContext},
    models::PoolCollection,
    FileSource, RefreshScheduler, Settings, SnapshotView, Store,
};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();

    // Load configuration
    let settings = Arc::new(
        Settings::new().context("Failed to load config file. Please ensure it is valid")?,
    );

    let store = Arc::new(Store::new());
    let source = FileSource::new(settings.source.data_dir.clone());
    info!("Reading fetch results from {}", source.data_dir().display());

    let mut scheduler = RefreshScheduler::new(settings.refresh.clone());
    register_fetch_actions(&mut scheduler, &source);
    register_report(&mut scheduler, store.clone(), settings.clone());

    // Set before start so the first fast tick covers the configured account
    match &settings.source.account {
        Some(account) => info!("Tracking account {}", account),
        None => info!("No account configured, user data will not be fetched"),
    }
    store.set_account(settings.source.account.clone());

    let handle = scheduler.start(store.clone());

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("farmsync running. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
        };
    }

    // In-flight fetches finish on their own; their commits are dropped
    handle.join().await;

    Ok(())
}

/// Wire the file source into the three cadences.
///
/// Failures are logged and left for the next tick to retry.
fn register_fetch_actions(scheduler: &mut RefreshScheduler, source: &FileSource) {
    for collection in PoolCollection::ALL {
        let public_source = source.clone();
        scheduler.register_slow_refresh(move |ctx: RefreshContext| {
            let source = public_source.clone();
            async move {
                match source.public_data(collection).await {
                    Ok(records) => {
                        ctx.sink.commit_public_data(collection, records);
                    },
                    Err(e) => error!("Failed to fetch {} public data: {:#}", collection.as_str(), e),
                }
            }
        });

        let user_source = source.clone();
        scheduler.register_fast_refresh(move |ctx: RefreshContext| {
            let source = user_source.clone();
            async move {
                let Some(account) = ctx.account.as_deref() else {
                    return;
                };
                match source.user_data(collection, account).await {
                    Ok(entries) => {
                        ctx.sink.commit_user_data(collection, account, entries);
                    },
                    Err(e) => error!("Failed to fetch {} user data: {:#}", collection.as_str(), e),
                }
            }
        });
    }

    let price_source = source.clone();
    scheduler.register_slow_refresh(move |ctx: RefreshContext| {
        let source = price_source.clone();
        async move {
            match source.prices().await {
                Ok(feed) => {
                    ctx.sink.commit_prices(feed);
                },
                Err(e) => error!("Failed to fetch price feed: {:#}", e),
            }
        }
    });

    let block_source = source.clone();
    scheduler.register_chain_head_refresh(move |ctx: RefreshContext| {
        let source = block_source.clone();
        async move {
            match source.block_number().await {
                Ok(block) => {
                    ctx.sink.commit_block(block);
                },
                Err(e) => error!("Failed to fetch block number: {:#}", e),
            }
        }
    });
}

/// Log the derived valuations on each slow tick that follows a new block.
fn register_report(scheduler: &mut RefreshScheduler, store: Arc<Store>, settings: Arc<Settings>) {
    let gate = Arc::new(Mutex::new(BlockGate::default()));

    scheduler.register_slow_refresh(move |ctx: RefreshContext| {
        let store = store.clone();
        let settings = settings.clone();
        let gate = gate.clone();
        async move {
            if !gate.lock().observe(ctx.block) {
                return;
            }

            let mut view = SnapshotView::new(store.snapshot(), &settings.pricing);
            let native_usd = view.native_price_usd();
            let governance_usd = view.governance_price_usd();
            info!(
                "Block {} (snapshot v{}): {} = ${}, {} = ${}",
                view.block().current,
                view.version(),
                settings.pricing.native_symbol,
                native_usd,
                settings.pricing.governance_symbol,
                governance_usd
            );

            if ctx.account.is_none() {
                return;
            }
            for collection in PoolCollection::ALL {
                info!(
                    "  {} staked: ${}",
                    collection.as_str(),
                    view.total_staked_usd(collection)
                );
            }
        }
    });
}
