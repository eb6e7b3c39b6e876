//! Typed decoding of the supported event kinds.
//!
//! Decoding is strict: malformed topics or short data yield `None`, never an
//! error that escapes the block. The raw log is persisted and counted under
//! its classified kind regardless; only the enriched row is dropped.

use alloy::primitives::{Address, I256, LogData, U256};
use alloy::sol_types::SolEvent;

use crate::abis::{aero, cl, curve, erc1155, erc20, erc721, v2, v3};
use crate::events::registry::TRANSFER_TOPIC;

/// A decoded log payload for one of the enrichable event kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedLog {
    Erc20Transfer {
        from: Address,
        to: Address,
        amount: U256,
    },
    Erc721Transfer {
        from: Address,
        to: Address,
        token_id: U256,
    },
    Erc1155Single {
        from: Address,
        to: Address,
        token_id: U256,
        amount: U256,
    },
    Erc1155Batch {
        from: Address,
        to: Address,
        token_ids: Vec<U256>,
        amounts: Vec<U256>,
    },
    SwapV2 {
        sender: Address,
        recipient: Address,
        amount0_in: U256,
        amount1_in: U256,
        amount0_out: U256,
        amount1_out: U256,
    },
    SwapV3 {
        sender: Address,
        recipient: Address,
        amount0: I256,
        amount1: I256,
        sqrt_price_x96: U256,
        liquidity: u128,
        tick: i32,
    },
    SwapCurve {
        buyer: Address,
        sold_id: i128,
        tokens_sold: U256,
        bought_id: i128,
        tokens_bought: U256,
    },
}

/// Decode a log into a typed record, dispatching on topic0 the same way the
/// classifier does (including the Transfer topic-count tie-break).
pub fn decode_log(log: &LogData) -> Option<DecodedLog> {
    let topic0 = *log.topics().first()?;

    if topic0 == TRANSFER_TOPIC {
        return if log.topics().len() == 4 {
            let ev = erc721::Transfer::decode_log_data(log).ok()?;
            Some(DecodedLog::Erc721Transfer {
                from: ev.from,
                to: ev.to,
                token_id: ev.tokenId,
            })
        } else {
            let ev = erc20::Transfer::decode_log_data(log).ok()?;
            Some(DecodedLog::Erc20Transfer {
                from: ev.from,
                to: ev.to,
                amount: ev.value,
            })
        };
    }

    match topic0 {
        t if t == erc1155::TransferSingle::SIGNATURE_HASH => {
            let ev = erc1155::TransferSingle::decode_log_data(log).ok()?;
            Some(DecodedLog::Erc1155Single {
                from: ev.from,
                to: ev.to,
                token_id: ev.id,
                amount: ev.value,
            })
        }
        t if t == erc1155::TransferBatch::SIGNATURE_HASH => {
            let ev = erc1155::TransferBatch::decode_log_data(log).ok()?;
            if ev.ids.len() != ev.values.len() {
                return None;
            }
            Some(DecodedLog::Erc1155Batch {
                from: ev.from,
                to: ev.to,
                token_ids: ev.ids,
                amounts: ev.values,
            })
        }
        t if t == v2::Swap::SIGNATURE_HASH => {
            let ev = v2::Swap::decode_log_data(log).ok()?;
            Some(DecodedLog::SwapV2 {
                sender: ev.sender,
                recipient: ev.to,
                amount0_in: ev.amount0In,
                amount1_in: ev.amount1In,
                amount0_out: ev.amount0Out,
                amount1_out: ev.amount1Out,
            })
        }
        t if t == aero::Swap::SIGNATURE_HASH => {
            let ev = aero::Swap::decode_log_data(log).ok()?;
            Some(DecodedLog::SwapV2 {
                sender: ev.sender,
                recipient: ev.to,
                amount0_in: ev.amount0In,
                amount1_in: ev.amount1In,
                amount0_out: ev.amount0Out,
                amount1_out: ev.amount1Out,
            })
        }
        t if t == v3::Swap::SIGNATURE_HASH => {
            let ev = v3::Swap::decode_log_data(log).ok()?;
            Some(DecodedLog::SwapV3 {
                sender: ev.sender,
                recipient: ev.recipient,
                amount0: ev.amount0,
                amount1: ev.amount1,
                sqrt_price_x96: U256::from(ev.sqrtPriceX96),
                liquidity: ev.liquidity,
                tick: ev.tick.as_i32(),
            })
        }
        t if t == cl::Swap::SIGNATURE_HASH => {
            let ev = cl::Swap::decode_log_data(log).ok()?;
            Some(DecodedLog::SwapV3 {
                sender: ev.sender,
                recipient: ev.recipient,
                amount0: ev.amount0,
                amount1: ev.amount1,
                sqrt_price_x96: U256::from(ev.sqrtPriceX96),
                liquidity: ev.liquidity,
                tick: ev.tick.as_i32(),
            })
        }
        t if t == curve::TokenExchange::SIGNATURE_HASH => {
            let ev = curve::TokenExchange::decode_log_data(log).ok()?;
            Some(DecodedLog::SwapCurve {
                buyer: ev.buyer,
                sold_id: ev.sold_id,
                tokens_sold: ev.tokens_sold,
                bought_id: ev.bought_id,
                tokens_bought: ev.tokens_bought,
            })
        }
        _ => None,
    }
}
