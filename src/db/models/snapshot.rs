use crate::db::models::{
    BlockMetrics, BlockRow, ContractDeployment, DexSwap, EventCount, LogRow, NftTransfer,
    ReceiptRow, TokenTransfer, TxRow,
};

/// Everything the store writes for one block, committed atomically.
///
/// Produced by the enricher; consumed only by `Store::commit_block`.
#[derive(Debug, Clone)]
pub struct BlockSnapshot {
    pub block: BlockRow,
    pub transactions: Vec<TxRow>,
    pub receipts: Vec<ReceiptRow>,
    pub logs: Vec<LogRow>,
    pub metrics: BlockMetrics,
    pub event_counts: Vec<EventCount>,
    pub token_transfers: Vec<TokenTransfer>,
    pub nft_transfers: Vec<NftTransfer>,
    pub dex_swaps: Vec<DexSwap>,
    pub deployments: Vec<ContractDeployment>,
}
