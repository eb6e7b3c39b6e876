use serde::{Deserialize, Serialize};

/// Entry in the per-block top-emitters list, JSON-encoded into
/// `block_metrics.top_contracts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopContract {
    pub address: String,
    pub count: u64,
}

/// One row in `block_metrics` — aggregates derived from a single block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMetrics {
    pub block_number: u64,
    pub tx_count: u64,
    pub log_count: u64,
    pub total_gas_used: u64,
    /// Integer division; zero for empty blocks.
    pub avg_gas_per_tx: u64,
    /// Top ten log emitters, count descending then address ascending.
    pub top_contracts: Vec<TopContract>,
    pub unique_senders: u64,
    pub unique_recipients: u64,
    /// Average effective gas price, decimal string (integer division).
    pub avg_gas_price: String,
    /// Average priority fee over the transactions that declared one.
    pub avg_priority_fee: String,
}

/// One row in `event_counts`: `(block_number, kind) → count`.
///
/// The kind namespace covers both log kinds and transaction kinds, so the
/// per-block sum reconciles against `log_count + tx_count`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCount {
    pub block_number: u64,
    pub kind: String,
    pub count: u64,
}
