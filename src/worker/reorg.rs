//! Reorg detection and rewind.
//!
//! Invoked before every block: checks that the remote chain still builds on
//! the last stored block, and if not, invalidates a bounded suffix of the
//! store so ingestion can replay forward on the new canonical chain.

use log::warn;

use crate::db::models::BlockRow;
use crate::db::Store;
use crate::error::IngestError;
use crate::rpc::Fetcher;
use crate::utils::topic_hex;

/// What the parent-hash comparison decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorgDecision {
    /// The remote chain extends the stored prefix; process `next`.
    Proceed,
    /// Parent-hash mismatch: invalidate everything from `to` upward and
    /// re-ingest starting there.
    Rewind { to: u64 },
}

pub struct ReorgController {
    rewind_depth: u64,
}

impl ReorgController {
    pub fn new(rewind_depth: u64) -> Self {
        Self { rewind_depth }
    }

    /// Pure decision: compare the stored predecessor's hash against the
    /// remote block's parent hash.
    pub fn resolve(
        &self,
        stored_prev: Option<&BlockRow>,
        remote_parent_hash: &str,
        next: u64,
    ) -> ReorgDecision {
        match stored_prev {
            // Nothing to check against (fresh store, or the predecessor was
            // itself flagged in an earlier rewind).
            None => ReorgDecision::Proceed,
            Some(prev) if prev.hash == remote_parent_hash => ReorgDecision::Proceed,
            Some(_) => ReorgDecision::Rewind {
                to: next.saturating_sub(self.rewind_depth),
            },
        }
    }

    /// Apply a rewind: flag the blocks, drop derived rows, and move the
    /// checkpoint back so the poller re-fetches from `to`.
    pub fn apply(&self, store: &Store, to: u64) -> Result<(), IngestError> {
        let flagged = store.mark_reorged(to)?;
        store.rewind(to)?;
        store.set_checkpoint(to.saturating_sub(1))?;
        warn!("Reorg rewind: flagged {flagged} blocks, replaying from {to}");
        Ok(())
    }

    /// Full check for `next`. Returns the block number the poller should
    /// process this iteration (either `next` or the rewind target).
    pub async fn check(
        &self,
        store: &Store,
        fetcher: &Fetcher,
        next: u64,
    ) -> Result<u64, IngestError> {
        if next == 0 {
            return Ok(0);
        }
        let stored_prev = store.block_by_number(next - 1)?;
        if stored_prev.is_none() {
            return Ok(next);
        }

        let remote = fetcher.block_header(next).await?;
        let remote_parent = topic_hex(&remote.header.parent_hash);

        match self.resolve(stored_prev.as_ref(), &remote_parent, next) {
            ReorgDecision::Proceed => Ok(next),
            ReorgDecision::Rewind { to } => {
                warn!(
                    "Parent-hash mismatch at block {next}: stored {} vs remote parent {remote_parent}",
                    stored_prev.map(|b| b.hash).unwrap_or_default(),
                );
                self.apply(store, to)?;
                Ok(to)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(number: u64, hash: &str) -> BlockRow {
        BlockRow {
            number,
            hash: hash.to_string(),
            parent_hash: String::new(),
            timestamp: 0,
            gas_used: 0,
            gas_limit: 0,
            base_fee: None,
            reorged: false,
        }
    }

    #[test]
    fn matching_parent_proceeds() {
        let controller = ReorgController::new(10);
        let prev = stored(100, "0xaa");
        assert_eq!(
            controller.resolve(Some(&prev), "0xaa", 101),
            ReorgDecision::Proceed
        );
    }

    #[test]
    fn missing_predecessor_proceeds() {
        let controller = ReorgController::new(10);
        assert_eq!(controller.resolve(None, "0xbb", 101), ReorgDecision::Proceed);
    }

    #[test]
    fn mismatch_rewinds_bounded_depth() {
        // Stored block 100 has hash 0xAA…, the remote block 101 claims
        // parent 0xBB…: rewind to 91.
        let controller = ReorgController::new(10);
        let prev = stored(100, "0xaa");
        assert_eq!(
            controller.resolve(Some(&prev), "0xbb", 101),
            ReorgDecision::Rewind { to: 91 }
        );
    }

    #[test]
    fn rewind_saturates_near_genesis() {
        let controller = ReorgController::new(10);
        let prev = stored(4, "0xaa");
        assert_eq!(
            controller.resolve(Some(&prev), "0xbb", 5),
            ReorgDecision::Rewind { to: 0 }
        );
    }

    #[test]
    fn apply_restores_consistent_prefix() {
        let store = Store::open_in_memory().unwrap();
        // Seed a checkpoint and stored blocks via direct ops.
        for n in 95..=100u64 {
            store
                .commit_block(&crate::db::models::BlockSnapshot {
                    block: stored(n, &format!("0x{n:x}")),
                    transactions: vec![],
                    receipts: vec![],
                    logs: vec![],
                    metrics: crate::db::models::BlockMetrics {
                        block_number: n,
                        tx_count: 0,
                        log_count: 0,
                        total_gas_used: 0,
                        avg_gas_per_tx: 0,
                        top_contracts: vec![],
                        unique_senders: 0,
                        unique_recipients: 0,
                        avg_gas_price: "0".into(),
                        avg_priority_fee: "0".into(),
                    },
                    event_counts: vec![],
                    token_transfers: vec![],
                    nft_transfers: vec![],
                    dex_swaps: vec![],
                    deployments: vec![],
                })
                .unwrap();
        }

        let controller = ReorgController::new(10);
        controller.apply(&store, 98).unwrap();

        assert_eq!(store.checkpoint().unwrap(), Some(97));
        assert!(store.block_by_number(98).unwrap().is_none());
        assert!(store.block_by_number(97).unwrap().is_some());
    }
}
