//! Type conversion and formatting helpers.
//!
//! Everything persisted as text goes through these functions so hex casing
//! and decimal rendering stay uniform across the store.

use alloy::primitives::{hex, Address, B256, U256};

/// Encode bytes as a lowercase hex string with 0x prefix.
pub fn hex_encode(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Lowercase hex form of an address, as stored in every address column.
pub fn address_hex(address: &Address) -> String {
    hex_encode(address.as_slice())
}

/// Lowercase hex form of a 32-byte topic or hash.
pub fn topic_hex(topic: &B256) -> String {
    hex_encode(topic.as_slice())
}

/// Decimal string rendering of a U256.
///
/// Amounts, gas prices, and fees are stored this way to preserve the full
/// 256-bit range.
pub fn u256_dec(value: U256) -> String {
    value.to_string()
}
