use std::sync::Arc;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use basewatch::{labels, rpc, DexResolver, Fetcher, Poller, Settings, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();

    let settings = Settings::new()
        .context("Failed to load configuration from the environment (is RPC_URL set?)")?;

    let store = Arc::new(Store::open(&settings.db_path)?);
    let seeded = store.seed_labels(&labels::seed())?;
    if seeded > 0 {
        info!("Seeded {seeded} contract labels");
    }

    let provider = rpc::build_provider(&settings.rpc_url)?;
    let fetcher = Arc::new(Fetcher::new(provider.clone(), settings.concurrency_limit));
    let resolver = DexResolver::new(store.clone(), provider)?;

    let cancellation_token = CancellationToken::new();
    let poller = Poller::new(fetcher, store, resolver, settings);

    let poller_token = cancellation_token.child_token();
    let mut poller_handle = tokio::spawn(async move { poller.run(poller_token).await });

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Ingester running. Press Ctrl+C to stop.");

    #[cfg(unix)]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
            },
            res = &mut poller_handle => {
                // The poller only returns on its own for fatal init errors.
                error!("Poller exited unexpectedly");
                return res.context("Poller task panicked")?;
            },
        };
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
            },
            res = &mut poller_handle => {
                error!("Poller exited unexpectedly");
                return res.context("Poller task panicked")?;
            },
        };
    }

    // Let the in-flight block finish, then wait for the loop to drain.
    cancellation_token.cancel();
    poller_handle.await.context("Poller task panicked")??;

    info!("Shutdown complete");
    Ok(())
}
