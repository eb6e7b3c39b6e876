//! JSON-RPC fetch layer.
//!
//! All network I/O for the pipeline goes through here: head tracking, block
//! bodies, and receipts. Every request is retried with exponential backoff;
//! the batch-receipts endpoint is probed once and a process-wide latch
//! permanently switches to per-hash fan-out if the node lacks it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use alloy::network::Network;
use alloy::primitives::B256;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::transports::TransportError;
use anyhow::Context;
use futures::{StreamExt, TryStreamExt};
use log::warn;
use op_alloy_network::Optimism;
use url::Url;

use crate::error::IngestError;

pub type OpProvider = DynProvider<Optimism>;
pub type OpBlock = <Optimism as Network>::BlockResponse;
pub type OpTx = <Optimism as Network>::TransactionResponse;
pub type OpReceipt = <Optimism as Network>::ReceiptResponse;

/// Retry budget per request.
const MAX_ATTEMPTS: u32 = 5;
/// First backoff delay; doubles per attempt.
const BASE_DELAY: Duration = Duration::from_secs(1);
/// Backoff ceiling.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Build the shared HTTP provider against the Base node.
///
/// The Optimism network type is required: Base blocks lead with a deposit
/// transaction (type 0x7E) that the Ethereum network types reject.
pub fn build_provider(rpc_url: &str) -> anyhow::Result<OpProvider> {
    let url: Url = rpc_url.parse().context("Invalid RPC URL")?;
    let provider = ProviderBuilder::new()
        .disable_recommended_fillers()
        .network::<Optimism>()
        .connect_http(url);
    Ok(DynProvider::new(provider))
}

pub struct Fetcher {
    provider: OpProvider,
    concurrency_limit: usize,
    /// Cleared permanently the first time `eth_getBlockReceipts` comes back
    /// unsupported.
    batch_receipts: AtomicBool,
}

impl Fetcher {
    pub fn new(provider: OpProvider, concurrency_limit: usize) -> Self {
        Self {
            provider,
            concurrency_limit: concurrency_limit.max(1),
            batch_receipts: AtomicBool::new(true),
        }
    }

    /// Most recent block number known to the node.
    pub async fn latest_head(&self) -> Result<u64, IngestError> {
        self.retry("eth_blockNumber", move || async move {
            self.provider.get_block_number().await
        })
        .await
    }

    /// Block with full transaction bodies.
    pub async fn block_with_txs(&self, number: u64) -> Result<OpBlock, IngestError> {
        self.retry("eth_getBlockByNumber", move || async move {
            self.provider.get_block_by_number(number.into()).full().await
        })
        .await?
        .ok_or(IngestError::BlockNotFound { number })
    }

    /// Block header only (transaction hashes); used by the reorg probe.
    pub async fn block_header(&self, number: u64) -> Result<OpBlock, IngestError> {
        self.retry("eth_getBlockByNumber", move || async move {
            self.provider.get_block_by_number(number.into()).await
        })
        .await?
        .ok_or(IngestError::BlockNotFound { number })
    }

    /// All receipts for a block.
    ///
    /// Prefers the single-round-trip batch endpoint. The first unsupported
    /// response flips the latch and every subsequent block goes straight to
    /// the bounded per-hash fan-out.
    pub async fn receipts(
        &self,
        number: u64,
        tx_hashes: &[B256],
    ) -> Result<Vec<OpReceipt>, IngestError> {
        if self.batch_receipts.load(Ordering::Relaxed) {
            match self
                .retry("eth_getBlockReceipts", move || async move {
                    self.provider.get_block_receipts(number.into()).await
                })
                .await
            {
                Ok(Some(receipts)) => return Ok(receipts),
                Ok(None) => {}
                Err(IngestError::MethodUnsupported { method }) => {
                    warn!("{method} unsupported by this node; switching to per-hash receipts");
                    self.batch_receipts.store(false, Ordering::Relaxed);
                }
                Err(e) => return Err(e),
            }
        }

        self.receipts_by_hash(tx_hashes).await
    }

    /// Per-hash receipt fan-out, at most `concurrency_limit` in flight,
    /// results in request order.
    async fn receipts_by_hash(&self, tx_hashes: &[B256]) -> Result<Vec<OpReceipt>, IngestError> {
        futures::stream::iter(tx_hashes.iter().copied())
            .map(move |hash| async move {
                self.retry("eth_getTransactionReceipt", move || async move {
                    self.provider.get_transaction_receipt(hash).await
                })
                .await?
                .ok_or_else(|| {
                    IngestError::transient("eth_getTransactionReceipt", format!("no receipt for {hash}"))
                })
            })
            .buffered(self.concurrency_limit)
            .try_collect()
            .await
    }

    async fn retry<T, Fut>(
        &self,
        operation: &'static str,
        mut request: impl FnMut() -> Fut,
    ) -> Result<T, IngestError>
    where
        Fut: std::future::Future<Output = Result<T, TransportError>>,
    {
        let mut attempt = 0u32;
        loop {
            match request().await {
                Ok(value) => return Ok(value),
                Err(e) if is_method_unsupported(&e) => {
                    return Err(IngestError::MethodUnsupported { method: operation });
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= MAX_ATTEMPTS {
                        return Err(IngestError::transient(operation, e.to_string()));
                    }
                    let delay = backoff_delay(attempt);
                    warn!(
                        "{operation} failed (attempt {attempt}/{MAX_ATTEMPTS}), retrying in {delay:?}: {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Exponential backoff: `BASE * 2^(attempt-1)`, capped at `MAX_DELAY`.
fn backoff_delay(attempt: u32) -> Duration {
    BASE_DELAY
        .saturating_mul(1u32 << (attempt - 1).min(16))
        .min(MAX_DELAY)
}

/// JSON-RPC "method not found" (-32601) or an explicit unsupported message.
fn is_method_unsupported(error: &TransportError) -> bool {
    match error {
        alloy::transports::RpcError::ErrorResp(payload) => {
            payload.code == -32601
                || payload.message.to_ascii_lowercase().contains("not supported")
        }
        alloy::transports::RpcError::UnsupportedFeature(_) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::rpc::json_rpc::ErrorPayload;

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_delay(1), Duration::from_secs(1));
        assert_eq!(backoff_delay(2), Duration::from_secs(2));
        assert_eq!(backoff_delay(3), Duration::from_secs(4));
        assert_eq!(backoff_delay(5), Duration::from_secs(16));
        assert_eq!(backoff_delay(6), Duration::from_secs(30));
        assert_eq!(backoff_delay(12), Duration::from_secs(30));
    }

    #[test]
    fn method_not_found_is_unsupported() {
        let err: TransportError = alloy::transports::RpcError::ErrorResp(ErrorPayload {
            code: -32601,
            message: "the method eth_getBlockReceipts does not exist".into(),
            data: None,
        });
        assert!(is_method_unsupported(&err));

        let err: TransportError = alloy::transports::RpcError::ErrorResp(ErrorPayload {
            code: -32000,
            message: "header not found".into(),
            data: None,
        });
        assert!(!is_method_unsupported(&err));
    }
}
