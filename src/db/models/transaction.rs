/// One row in `transactions`, keyed by hash.
///
/// Monetary fields are decimal strings to preserve the 256-bit range;
/// `gas_used` and `effective_gas_price` are joined in from the receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRow {
    pub hash: String,
    pub block_number: u64,
    pub from_address: String,
    /// `None` for contract creations.
    pub to_address: Option<String>,
    pub value: String,
    pub input: Vec<u8>,
    pub gas_price: Option<String>,
    pub max_fee_per_gas: Option<String>,
    pub max_priority_fee_per_gas: Option<String>,
    pub gas_used: Option<u64>,
    pub effective_gas_price: Option<String>,
    /// Envelope tag: `legacy`, `eip2930`, `eip1559`, `eip4844`, `eip7702`,
    /// or `deposit`; `unknown` for unrecognized types.
    pub tx_type: String,
}
