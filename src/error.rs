//! Semantic error kinds for the ingestion pipeline.
//!
//! The poller only distinguishes these by policy: transient RPC and store
//! failures are retried on the same block, an unsupported batch method
//! latches the fetcher, and config errors abort startup.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// Network, 5xx, timeout, or rate-limit failure that survived the
    /// fetcher's retry budget.
    #[error("rpc request failed during {operation}: {message}")]
    TransientRpc {
        operation: &'static str,
        message: String,
    },

    /// The node does not implement the requested method. Only ever produced
    /// by the batch-receipts probe.
    #[error("rpc method not supported: {method}")]
    MethodUnsupported { method: &'static str },

    /// A block expected to exist (behind the safety buffer) was not returned.
    #[error("block {number} not found")]
    BlockNotFound { number: u64 },

    /// Transaction abort, constraint violation, or I/O error in the store.
    #[error("store failure")]
    Store(#[from] rusqlite::Error),

    /// Invalid configuration detected at startup.
    #[error("fatal config: {0}")]
    FatalConfig(String),
}

impl IngestError {
    pub fn transient(operation: &'static str, message: impl Into<String>) -> Self {
        Self::TransientRpc {
            operation,
            message: message.into(),
        }
    }
}
