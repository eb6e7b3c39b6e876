use alloy::primitives::{Address, I256, U256};

use crate::utils::{address_hex, u256_dec};

/// DEX swap extracted from a log. The four amount columns are the in/out
/// legs for each of the pool's two tokens, decimal-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DexSwap {
    pub tx_hash: String,
    pub block_number: u64,
    pub log_index: u64,
    pub pool_address: String,
    pub dex_name: String,
    pub sender: String,
    pub recipient: String,
    pub amount0_in: String,
    pub amount1_in: String,
    pub amount0_out: String,
    pub amount1_out: String,
}

impl DexSwap {
    /// V2-shaped swaps (Uniswap V2 and solidly/ve(3,3) pairs) already carry
    /// the four legs explicitly.
    #[allow(clippy::too_many_arguments)]
    pub fn from_packed(
        tx_hash: String,
        block_number: u64,
        log_index: u64,
        pool: &Address,
        dex_name: String,
        sender: &Address,
        recipient: &Address,
        amount0_in: U256,
        amount1_in: U256,
        amount0_out: U256,
        amount1_out: U256,
    ) -> Self {
        Self {
            tx_hash,
            block_number,
            log_index,
            pool_address: address_hex(pool),
            dex_name,
            sender: address_hex(sender),
            recipient: address_hex(recipient),
            amount0_in: u256_dec(amount0_in),
            amount1_in: u256_dec(amount1_in),
            amount0_out: u256_dec(amount0_out),
            amount1_out: u256_dec(amount1_out),
        }
    }

    /// V3/CL swaps report signed deltas from the pool's perspective: a
    /// positive amount entered the pool (user sold it), a negative amount
    /// left it.
    #[allow(clippy::too_many_arguments)]
    pub fn from_signed(
        tx_hash: String,
        block_number: u64,
        log_index: u64,
        pool: &Address,
        dex_name: String,
        sender: &Address,
        recipient: &Address,
        amount0: I256,
        amount1: I256,
    ) -> Self {
        let (amount0_in, amount0_out) = split_signed(amount0);
        let (amount1_in, amount1_out) = split_signed(amount1);
        Self {
            tx_hash,
            block_number,
            log_index,
            pool_address: address_hex(pool),
            dex_name,
            sender: address_hex(sender),
            recipient: address_hex(recipient),
            amount0_in,
            amount1_in,
            amount0_out,
            amount1_out,
        }
    }

    /// Curve `TokenExchange`: coin indices select which leg each amount
    /// lands in. Indices above 1 collapse onto token1 (two-column model).
    #[allow(clippy::too_many_arguments)]
    pub fn from_curve(
        tx_hash: String,
        block_number: u64,
        log_index: u64,
        pool: &Address,
        dex_name: String,
        buyer: &Address,
        sold_id: i128,
        tokens_sold: U256,
        bought_id: i128,
        tokens_bought: U256,
    ) -> Self {
        let mut amount0_in = U256::ZERO;
        let mut amount1_in = U256::ZERO;
        let mut amount0_out = U256::ZERO;
        let mut amount1_out = U256::ZERO;
        if sold_id == 0 {
            amount0_in = tokens_sold;
        } else {
            amount1_in = tokens_sold;
        }
        if bought_id == 0 {
            amount0_out = tokens_bought;
        } else {
            amount1_out = tokens_bought;
        }
        Self {
            tx_hash,
            block_number,
            log_index,
            pool_address: address_hex(pool),
            dex_name,
            sender: address_hex(buyer),
            recipient: address_hex(buyer),
            amount0_in: u256_dec(amount0_in),
            amount1_in: u256_dec(amount1_in),
            amount0_out: u256_dec(amount0_out),
            amount1_out: u256_dec(amount1_out),
        }
    }
}

fn split_signed(amount: I256) -> (String, String) {
    if amount.is_negative() {
        ("0".to_string(), u256_dec(amount.unsigned_abs()))
    } else {
        (u256_dec(amount.unsigned_abs()), "0".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn signed_amounts_split_by_sign() {
        let pool = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let actor = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let swap = DexSwap::from_signed(
            "0xdead".into(),
            1,
            0,
            &pool,
            "Uniswap V3".into(),
            &actor,
            &actor,
            I256::try_from(1_000i64).unwrap(),
            I256::try_from(-997i64).unwrap(),
        );
        assert_eq!(swap.amount0_in, "1000");
        assert_eq!(swap.amount0_out, "0");
        assert_eq!(swap.amount1_in, "0");
        assert_eq!(swap.amount1_out, "997");
    }

    #[test]
    fn curve_legs_follow_coin_indices() {
        let pool = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let buyer = address!("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb");
        let swap = DexSwap::from_curve(
            "0xdead".into(),
            1,
            0,
            &pool,
            "Curve".into(),
            &buyer,
            1,
            U256::from(500u64),
            0,
            U256::from(499u64),
        );
        assert_eq!(swap.amount1_in, "500");
        assert_eq!(swap.amount0_out, "499");
        assert_eq!(swap.amount0_in, "0");
        assert_eq!(swap.amount1_out, "0");
    }
}
