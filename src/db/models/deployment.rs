/// Contract deployment derived from a creation transaction's receipt.
/// Tx-scoped: there is no log index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDeployment {
    pub tx_hash: String,
    pub block_number: u64,
    pub deployer: String,
    pub contract_address: String,
}
