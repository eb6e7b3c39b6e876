/// One row in `logs`. Append-only with an autoincrement surrogate key; the
/// semantic identity is `(tx_hash, log_index)` and survives rewind/replay
/// even though the surrogate id does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub tx_hash: String,
    pub block_number: u64,
    /// Index of the log within its block.
    pub log_index: u64,
    pub address: String,
    pub topic0: Option<String>,
    pub topic1: Option<String>,
    pub topic2: Option<String>,
    pub topic3: Option<String>,
    pub data: Vec<u8>,
}
