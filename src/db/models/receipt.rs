/// One row in `receipts`, 1:1 with a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptRow {
    pub tx_hash: String,
    pub block_number: u64,
    pub status: bool,
    pub gas_used: u64,
    pub log_count: u64,
    /// Set when the transaction deployed a contract.
    pub contract_address: Option<String>,
    pub effective_gas_price: String,
    /// OP Stack L1 data fee, when the node reports one.
    pub l1_fee: Option<String>,
}
