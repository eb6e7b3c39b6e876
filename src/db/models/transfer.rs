use alloy::primitives::{Address, U256};

use crate::utils::{address_hex, u256_dec};

/// ERC-20 transfer extracted from a log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    pub tx_hash: String,
    pub block_number: u64,
    pub log_index: u64,
    pub token_address: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: String,
}

impl TokenTransfer {
    pub fn from_erc20(
        tx_hash: String,
        block_number: u64,
        log_index: u64,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Self {
        Self {
            tx_hash,
            block_number,
            log_index,
            token_address: address_hex(token),
            from_address: address_hex(from),
            to_address: address_hex(to),
            amount: u256_dec(amount),
        }
    }
}

/// ERC-721 or ERC-1155 transfer extracted from a log. Batch ERC-1155
/// transfers produce one row per `(id, amount)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NftTransfer {
    pub tx_hash: String,
    pub block_number: u64,
    pub log_index: u64,
    pub token_address: String,
    pub from_address: String,
    pub to_address: String,
    pub token_id: String,
    pub amount: String,
    /// `ERC721` or `ERC1155`.
    pub standard: String,
}

impl NftTransfer {
    pub fn from_erc721(
        tx_hash: String,
        block_number: u64,
        log_index: u64,
        token: &Address,
        from: &Address,
        to: &Address,
        token_id: U256,
    ) -> Self {
        Self {
            tx_hash,
            block_number,
            log_index,
            token_address: address_hex(token),
            from_address: address_hex(from),
            to_address: address_hex(to),
            token_id: u256_dec(token_id),
            amount: "1".to_string(),
            standard: "ERC721".to_string(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn from_erc1155(
        tx_hash: String,
        block_number: u64,
        log_index: u64,
        token: &Address,
        from: &Address,
        to: &Address,
        token_id: U256,
        amount: U256,
    ) -> Self {
        Self {
            tx_hash,
            block_number,
            log_index,
            token_address: address_hex(token),
            from_address: address_hex(from),
            to_address: address_hex(to),
            token_id: u256_dec(token_id),
            amount: u256_dec(amount),
            standard: "ERC1155".to_string(),
        }
    }
}
