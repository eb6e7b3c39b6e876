//! The outer ingestion loop.
//!
//! One block in flight at a time: reorg check, fetch, enrich, commit,
//! advance. Sleeps within the safety buffer of the head, runs flat out when
//! behind, and backs off on errors without skipping the failed block.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use alloy::network::TransactionResponse as _;
use alloy::primitives::B256;
use log::{error, info};
use tokio_util::sync::CancellationToken;

use crate::config::Settings;
use crate::db::Store;
use crate::dex::DexResolver;
use crate::rpc::Fetcher;
use crate::worker::enricher::enrich_block;
use crate::worker::reorg::ReorgController;

/// Minimum lag before the loop reports itself as catching up.
const CATCHUP_THRESHOLD: u64 = 5;
/// Progress log throttle while catching up.
const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Read-only health counters, updated by the loop and shared with whoever
/// wants to observe it.
pub struct Health {
    last_block: AtomicU64,
    session_blocks: AtomicU64,
    blocks_behind: AtomicU64,
    catching_up: AtomicBool,
    errors: AtomicU64,
    started: Instant,
}

#[derive(Debug, Clone)]
pub struct HealthSnapshot {
    pub last_block: u64,
    pub session_blocks: u64,
    pub blocks_behind: u64,
    pub catching_up: bool,
    pub errors: u64,
    pub uptime_secs: u64,
    pub blocks_per_sec: f64,
}

impl Health {
    fn new() -> Self {
        Self {
            last_block: AtomicU64::new(0),
            session_blocks: AtomicU64::new(0),
            blocks_behind: AtomicU64::new(0),
            catching_up: AtomicBool::new(false),
            errors: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        let uptime = self.started.elapsed().as_secs();
        let session_blocks = self.session_blocks.load(Ordering::Relaxed);
        HealthSnapshot {
            last_block: self.last_block.load(Ordering::Relaxed),
            session_blocks,
            blocks_behind: self.blocks_behind.load(Ordering::Relaxed),
            catching_up: self.catching_up.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            uptime_secs: uptime,
            blocks_per_sec: if uptime > 0 {
                session_blocks as f64 / uptime as f64
            } else {
                0.0
            },
        }
    }
}

pub struct Poller {
    fetcher: Arc<Fetcher>,
    store: Arc<Store>,
    resolver: Arc<DexResolver>,
    reorg: ReorgController,
    settings: Settings,
    health: Arc<Health>,
}

impl Poller {
    pub fn new(
        fetcher: Arc<Fetcher>,
        store: Arc<Store>,
        resolver: Arc<DexResolver>,
        settings: Settings,
    ) -> Self {
        Self {
            fetcher,
            store,
            resolver,
            reorg: ReorgController::new(settings.reorg_rewind_depth),
            settings,
            health: Arc::new(Health::new()),
        }
    }

    pub fn health(&self) -> Arc<Health> {
        self.health.clone()
    }

    /// Run until cancelled. Returns early only on a fatal initialization
    /// failure (no checkpoint and the head cannot be fetched).
    pub async fn run(&self, token: CancellationToken) -> anyhow::Result<()> {
        let poll_interval = Duration::from_millis(self.settings.poll_interval_ms);
        let error_backoff = poll_interval * 2;

        let checkpoint = match self.store.checkpoint()? {
            Some(n) => n,
            None => {
                let head = self.fetcher.latest_head().await?;
                let seed = head.saturating_sub(self.settings.safety_buffer_blocks);
                self.store.set_checkpoint(seed)?;
                info!("No checkpoint found; seeding at {seed} (head {head})");
                seed
            }
        };

        let mut next = checkpoint + 1;
        let mut last_progress_log = Instant::now();
        info!("Poller starting at block {next}");

        while !token.is_cancelled() {
            let head = match self.fetcher.latest_head().await {
                Ok(head) => head,
                Err(e) => {
                    error!("Head fetch failed: {e}");
                    self.health.errors.fetch_add(1, Ordering::Relaxed);
                    sleep_or_cancel(&token, error_backoff).await;
                    continue;
                }
            };

            let safe_head = head.saturating_sub(self.settings.safety_buffer_blocks);
            self.health
                .blocks_behind
                .store(safe_head.saturating_sub(next.saturating_sub(1)), Ordering::Relaxed);

            if next > safe_head {
                self.health.catching_up.store(false, Ordering::Relaxed);
                sleep_or_cancel(&token, poll_interval).await;
                continue;
            }

            let catching_up = safe_head - next > CATCHUP_THRESHOLD;
            self.health.catching_up.store(catching_up, Ordering::Relaxed);

            // Process contiguous blocks up to the safe head. The reorg check
            // may move the target backwards; the cursor follows it.
            while next <= safe_head && !token.is_cancelled() {
                match self.process_one(next, &token).await {
                    Ok(committed) => {
                        self.health.last_block.store(committed, Ordering::Relaxed);
                        self.health.session_blocks.fetch_add(1, Ordering::Relaxed);
                        next = committed + 1;
                    }
                    Err(e) => {
                        error!("Block {next} failed: {e:#}; retrying after backoff");
                        self.health.errors.fetch_add(1, Ordering::Relaxed);
                        sleep_or_cancel(&token, error_backoff).await;
                        break;
                    }
                }

                if catching_up && last_progress_log.elapsed() >= PROGRESS_LOG_INTERVAL {
                    let snap = self.health.snapshot();
                    let eta_secs = if snap.blocks_per_sec > 0.0 {
                        (snap.blocks_behind as f64 / snap.blocks_per_sec) as u64
                    } else {
                        0
                    };
                    info!(
                        "Catching up: block {} ({} behind, {:.1} blocks/s, ETA {}s)",
                        snap.last_block, snap.blocks_behind, snap.blocks_per_sec, eta_secs
                    );
                    last_progress_log = Instant::now();
                }
            }
        }

        let snap = self.health.snapshot();
        info!(
            "Poller stopped at block {} ({} blocks this session, {} errors)",
            snap.last_block, snap.session_blocks, snap.errors
        );
        Ok(())
    }

    /// One full per-block pipeline pass. Returns the committed block number,
    /// which is the rewind target when a reorg was handled.
    async fn process_one(&self, next: u64, token: &CancellationToken) -> anyhow::Result<u64> {
        let target = self.reorg.check(&self.store, &self.fetcher, next).await?;

        let block = self.fetcher.block_with_txs(target).await?;

        // Shutdown is honored between fetch phases but never mid-commit.
        if token.is_cancelled() {
            anyhow::bail!("cancelled before receipts for block {target}");
        }

        let tx_hashes: Vec<B256> = block
            .transactions
            .as_transactions()
            .unwrap_or_default()
            .iter()
            .map(|tx| tx.tx_hash())
            .collect();
        let receipts = self.fetcher.receipts(target, &tx_hashes).await?;

        let snapshot = enrich_block(&block, &receipts, self.resolver.as_ref());
        self.store.commit_block(&snapshot)?;

        Ok(target)
    }
}

async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) {
    tokio::select! {
        _ = token.cancelled() => {}
        _ = tokio::time::sleep(duration) => {}
    }
}
