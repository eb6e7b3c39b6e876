//! Curated contract labels for Base, seeded into the store at startup.

use crate::db::models::ContractLabel;

/// Well-known Base contracts. Kept short on purpose: the table exists so
/// the stats report can name the heavy hitters, not to label the world.
pub fn seed() -> Vec<ContractLabel> {
    [
        ("0x4200000000000000000000000000000000000006", "WETH", "token", "Canonical"),
        ("0x833589fcd6edb6e08f4c7c32d4f71b54bda02913", "USDC", "token", "Circle"),
        ("0x2ae3f1ec7f1f5012cfeab0185bfc7aa3cf0dec22", "cbETH", "token", "Coinbase"),
        ("0x50c5725949a6f0c72e6c4a641f24049a917db0cb", "DAI", "token", "Maker"),
        ("0x4200000000000000000000000000000000000010", "L2StandardBridge", "bridge", "OP Stack"),
        ("0x4200000000000000000000000000000000000007", "L2CrossDomainMessenger", "bridge", "OP Stack"),
        ("0x4200000000000000000000000000000000000015", "L1Block", "system", "OP Stack"),
        ("0x4200000000000000000000000000000000000011", "SequencerFeeVault", "system", "OP Stack"),
        ("0x33128a8fc17869897dce68ed026d694621f6fdfd", "UniswapV3Factory", "dex", "Uniswap V3"),
        ("0x2626664c2603336e57b271c5c0b26f421741e481", "SwapRouter02", "dex", "Uniswap V3"),
        ("0x498581ff718922c3f8e6a244956af099b2652b2b", "PoolManager", "dex", "Uniswap V4"),
        ("0x420dd381b31aef6683db6b902084cb0ffece40da", "PoolFactory", "dex", "Aerodrome"),
        ("0xcf77a3ba9a5ca399b7c97c74d54e5b1beb874e43", "Router", "dex", "Aerodrome"),
        ("0x5ff137d4b0fdcd49dca30c7cf57e578a026d2789", "EntryPoint v0.6", "account_abstraction", "ERC-4337"),
        ("0x0000000071727de22e5e9d8baf0edac6f37da032", "EntryPoint v0.7", "account_abstraction", "ERC-4337"),
        ("0xca11bde05977b3631167028862be2a173976ca11", "Multicall3", "infra", "Multicall"),
        ("0xa238dd80c259a72e81d7e4664a9801593f98d1c5", "Pool", "lending", "Aave V3"),
    ]
    .into_iter()
    .map(|(address, name, category, protocol)| ContractLabel::new(address, name, category, protocol))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_addresses_are_lowercase_and_unique() {
        let labels = seed();
        let mut seen = std::collections::HashSet::new();
        for label in &labels {
            assert_eq!(label.address, label.address.to_lowercase());
            assert!(label.address.starts_with("0x") && label.address.len() == 42);
            assert!(seen.insert(label.address.clone()), "duplicate {}", label.address);
        }
    }
}
