/// One row in `blocks` — the anchor entity every other table hangs off.
///
/// Rows are never deleted; a rewind flips `reorged` so the gap in the
/// abandoned region stays observable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRow {
    pub number: u64,
    pub hash: String,
    pub parent_hash: String,
    pub timestamp: u64,
    pub gas_used: u64,
    pub gas_limit: u64,
    pub base_fee: Option<u64>,
    pub reorged: bool,
}
