//! Per-block enrichment.
//!
//! A pure reduction over `(block, receipts)`: classifies every transaction
//! and log, accumulates the block metrics, and extracts the enriched rows.
//! The only outside call is the resolver's synchronous cache lookup, which
//! never blocks.

use alloy::consensus::{Transaction as _, TxReceipt as _};
use alloy::network::eip2718::Typed2718;
use alloy::network::ReceiptResponse as _;
use alloy::network::TransactionResponse as _;
use alloy::primitives::U256;
use alloy::rpc::types::Log;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::db::models::{
    BlockMetrics, BlockRow, BlockSnapshot, ContractDeployment, DexSwap, EventCount, LogRow,
    NftTransfer, ReceiptRow, TokenTransfer, TopContract, TxRow,
};
use crate::dex::DexLookup;
use crate::events::{classify_log, classify_tx, decode_log, DecodedLog};
use crate::rpc::{OpBlock, OpReceipt};
use crate::utils::{address_hex, topic_hex, u256_dec};

/// Reduce one block and its receipts into the snapshot the store commits.
///
/// Receipts are matched to transactions by hash, so both receipt fetch paths
/// (batch and per-hash fan-out) produce identical output.
pub fn enrich_block(
    block: &OpBlock,
    receipts: &[OpReceipt],
    resolver: &impl DexLookup,
) -> BlockSnapshot {
    let number = block.header.number;

    let block_row = BlockRow {
        number,
        hash: topic_hex(&block.header.hash),
        parent_hash: topic_hex(&block.header.parent_hash),
        timestamp: block.header.timestamp,
        gas_used: block.header.gas_used,
        gas_limit: block.header.gas_limit,
        base_fee: block.header.base_fee_per_gas,
        reorged: false,
    };

    let receipt_by_hash: FxHashMap<String, &OpReceipt> = receipts
        .iter()
        .map(|r| (topic_hex(&r.inner.transaction_hash), r))
        .collect();

    let mut kind_counts: FxHashMap<&'static str, u64> = FxHashMap::default();
    let mut senders: FxHashSet<String> = FxHashSet::default();
    let mut recipients: FxHashSet<String> = FxHashSet::default();
    let mut transactions = Vec::new();
    let mut receipt_rows = Vec::new();
    let mut deployments = Vec::new();

    let mut total_gas = 0u64;
    let mut gas_price_sum = U256::ZERO;
    let mut priority_fee_sum = U256::ZERO;
    let mut priority_fee_count = 0u64;

    let txs = block.transactions.as_transactions().unwrap_or_default();
    for tx in txs {
        let hash = topic_hex(&tx.tx_hash());
        let from = tx.from();
        let to = tx.to();
        let receipt = receipt_by_hash.get(&hash);

        let tx_kind = classify_tx(to.is_some(), tx.value(), tx.input());
        *kind_counts.entry(tx_kind.as_str()).or_default() += 1;

        senders.insert(address_hex(&from));
        if let Some(to) = &to {
            recipients.insert(address_hex(to));
        }

        let ty = tx.ty();
        let max_priority = tx.max_priority_fee_per_gas();
        if let Some(fee) = max_priority {
            priority_fee_sum += U256::from(fee);
            priority_fee_count += 1;
        }

        let (gas_used, effective_gas_price) = match receipt {
            Some(r) => (
                Some(r.inner.gas_used),
                Some(u256_dec(U256::from(r.inner.effective_gas_price))),
            ),
            None => (None, None),
        };
        if let Some(r) = receipt {
            total_gas += r.inner.gas_used;
            gas_price_sum += U256::from(r.inner.effective_gas_price);
        }

        transactions.push(TxRow {
            hash: hash.clone(),
            block_number: number,
            from_address: address_hex(&from),
            to_address: to.as_ref().map(address_hex),
            value: u256_dec(tx.value()),
            input: tx.input().to_vec(),
            gas_price: alloy::consensus::Transaction::gas_price(tx)
                .map(|p| u256_dec(U256::from(p))),
            max_fee_per_gas: uses_dynamic_fees(ty).then(|| {
                u256_dec(U256::from(alloy::consensus::Transaction::max_fee_per_gas(tx)))
            }),
            max_priority_fee_per_gas: max_priority.map(|p| u256_dec(U256::from(p))),
            gas_used,
            effective_gas_price,
            tx_type: tx_type_tag(ty).to_string(),
        });

        if let Some(r) = receipt {
            receipt_rows.push(receipt_row(r, &hash, number));
            if let Some(created) = r.inner.contract_address {
                deployments.push(ContractDeployment {
                    tx_hash: hash.clone(),
                    block_number: number,
                    deployer: address_hex(&from),
                    contract_address: address_hex(&created),
                });
            }
        }
    }

    // Log pass: classify, count, decode, enrich.
    let mut logs = Vec::new();
    let mut emitter_counts: FxHashMap<String, u64> = FxHashMap::default();
    let mut token_transfers = Vec::new();
    let mut nft_transfers = Vec::new();
    let mut dex_swaps = Vec::new();

    for receipt in receipts {
        let receipt_tx_hash = topic_hex(&receipt.inner.transaction_hash);
        for log in receipt.inner.inner.logs() {
            process_log(
                log,
                &receipt_tx_hash,
                number,
                resolver,
                &mut logs,
                &mut kind_counts,
                &mut emitter_counts,
                &mut token_transfers,
                &mut nft_transfers,
                &mut dex_swaps,
            );
        }
    }

    let tx_count = transactions.len() as u64;
    let log_count = logs.len() as u64;

    let metrics = BlockMetrics {
        block_number: number,
        tx_count,
        log_count,
        total_gas_used: total_gas,
        avg_gas_per_tx: if tx_count > 0 { total_gas / tx_count } else { 0 },
        top_contracts: top_contracts(&emitter_counts),
        unique_senders: senders.len() as u64,
        unique_recipients: recipients.len() as u64,
        avg_gas_price: average(gas_price_sum, tx_count),
        avg_priority_fee: average(priority_fee_sum, priority_fee_count),
    };

    let mut event_counts: Vec<EventCount> = kind_counts
        .into_iter()
        .map(|(kind, count)| EventCount {
            block_number: number,
            kind: kind.to_string(),
            count,
        })
        .collect();
    event_counts.sort_by(|a, b| a.kind.cmp(&b.kind));

    BlockSnapshot {
        block: block_row,
        transactions,
        receipts: receipt_rows,
        logs,
        metrics,
        event_counts,
        token_transfers,
        nft_transfers,
        dex_swaps,
        deployments,
    }
}

#[allow(clippy::too_many_arguments)]
fn process_log(
    log: &Log,
    receipt_tx_hash: &str,
    number: u64,
    resolver: &impl DexLookup,
    logs: &mut Vec<LogRow>,
    kind_counts: &mut FxHashMap<&'static str, u64>,
    emitter_counts: &mut FxHashMap<String, u64>,
    token_transfers: &mut Vec<TokenTransfer>,
    nft_transfers: &mut Vec<NftTransfer>,
    dex_swaps: &mut Vec<DexSwap>,
) {
    let address = log.address();
    let address_str = address_hex(&address);
    let topics = log.topics();
    let tx_hash = log
        .transaction_hash
        .map(|h| topic_hex(&h))
        .unwrap_or_else(|| receipt_tx_hash.to_string());
    let log_index = log.log_index.unwrap_or(logs.len() as u64);

    let kind = classify_log(topics.first(), topics.len());
    *kind_counts.entry(kind.as_str()).or_default() += 1;
    *emitter_counts.entry(address_str.clone()).or_default() += 1;

    logs.push(LogRow {
        tx_hash: tx_hash.clone(),
        block_number: number,
        log_index,
        address: address_str,
        topic0: topics.first().map(topic_hex),
        topic1: topics.get(1).map(topic_hex),
        topic2: topics.get(2).map(topic_hex),
        topic3: topics.get(3).map(topic_hex),
        data: log.data().data.to_vec(),
    });

    // A failed decode drops only the enriched row; the raw log row and the
    // event count above already happened.
    let Some(decoded) = decode_log(&log.inner.data) else {
        return;
    };

    match decoded {
        DecodedLog::Erc20Transfer { from, to, amount } => {
            token_transfers.push(TokenTransfer::from_erc20(
                tx_hash, number, log_index, &address, &from, &to, amount,
            ));
        }
        DecodedLog::Erc721Transfer { from, to, token_id } => {
            nft_transfers.push(NftTransfer::from_erc721(
                tx_hash, number, log_index, &address, &from, &to, token_id,
            ));
        }
        DecodedLog::Erc1155Single {
            from,
            to,
            token_id,
            amount,
        } => {
            nft_transfers.push(NftTransfer::from_erc1155(
                tx_hash, number, log_index, &address, &from, &to, token_id, amount,
            ));
        }
        DecodedLog::Erc1155Batch {
            from,
            to,
            token_ids,
            amounts,
        } => {
            for (token_id, amount) in token_ids.into_iter().zip(amounts) {
                nft_transfers.push(NftTransfer::from_erc1155(
                    tx_hash.clone(),
                    number,
                    log_index,
                    &address,
                    &from,
                    &to,
                    token_id,
                    amount,
                ));
            }
        }
        DecodedLog::SwapV2 {
            sender,
            recipient,
            amount0_in,
            amount1_in,
            amount0_out,
            amount1_out,
        } => {
            let topic0 = topics.first().copied().unwrap_or_default();
            dex_swaps.push(DexSwap::from_packed(
                tx_hash,
                number,
                log_index,
                &address,
                resolver.dex_name(&address, &topic0),
                &sender,
                &recipient,
                amount0_in,
                amount1_in,
                amount0_out,
                amount1_out,
            ));
        }
        DecodedLog::SwapV3 {
            sender,
            recipient,
            amount0,
            amount1,
            ..
        } => {
            let topic0 = topics.first().copied().unwrap_or_default();
            dex_swaps.push(DexSwap::from_signed(
                tx_hash,
                number,
                log_index,
                &address,
                resolver.dex_name(&address, &topic0),
                &sender,
                &recipient,
                amount0,
                amount1,
            ));
        }
        DecodedLog::SwapCurve {
            buyer,
            sold_id,
            tokens_sold,
            bought_id,
            tokens_bought,
        } => {
            let topic0 = topics.first().copied().unwrap_or_default();
            dex_swaps.push(DexSwap::from_curve(
                tx_hash,
                number,
                log_index,
                &address,
                resolver.dex_name(&address, &topic0),
                &buyer,
                sold_id,
                tokens_sold,
                bought_id,
                tokens_bought,
            ));
        }
    }
}

fn receipt_row(receipt: &OpReceipt, tx_hash: &str, number: u64) -> ReceiptRow {
    ReceiptRow {
        tx_hash: tx_hash.to_string(),
        block_number: number,
        status: receipt.inner.status(),
        gas_used: receipt.inner.gas_used,
        log_count: receipt.inner.inner.logs().len() as u64,
        contract_address: receipt.inner.contract_address.as_ref().map(address_hex),
        effective_gas_price: u256_dec(U256::from(receipt.inner.effective_gas_price)),
        l1_fee: receipt.l1_block_info.l1_fee.map(|f| u256_dec(U256::from(f))),
    }
}

/// Textual transaction type tag.
fn tx_type_tag(ty: u8) -> &'static str {
    match ty {
        0 => "legacy",
        1 => "eip2930",
        2 => "eip1559",
        3 => "eip4844",
        4 => "eip7702",
        0x7E => "deposit",
        _ => "unknown",
    }
}

fn uses_dynamic_fees(ty: u8) -> bool {
    matches!(ty, 2 | 3 | 4)
}

/// Integer-division average over a U256 sum; "0" when the divisor is zero.
fn average(sum: U256, count: u64) -> String {
    if count == 0 {
        "0".to_string()
    } else {
        u256_dec(sum / U256::from(count))
    }
}

/// Top ten emitters: count descending, ties broken by address order.
fn top_contracts(counts: &FxHashMap<String, u64>) -> Vec<TopContract> {
    let mut all: Vec<TopContract> = counts
        .iter()
        .map(|(address, count)| TopContract {
            address: address.clone(),
            count: *count,
        })
        .collect();
    all.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.address.cmp(&b.address)));
    all.truncate(10);
    all
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abis::{erc20, v3};
    use crate::events::EventKind;
    use alloy::primitives::{address, Address, B256, I256};
    use alloy::sol_types::SolEvent;

    struct StubResolver;

    impl DexLookup for StubResolver {
        fn dex_name(&self, _pool: &Address, topic0: &B256) -> String {
            if *topic0 == v3::Swap::SIGNATURE_HASH {
                "Uniswap V3".to_string()
            } else {
                "Unknown DEX".to_string()
            }
        }
    }

    fn rpc_log(emitter: Address, data: alloy::primitives::LogData, index: u64) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address: emitter,
                data,
            },
            block_hash: None,
            block_number: Some(1),
            block_timestamp: None,
            transaction_hash: Some(B256::repeat_byte(0xab)),
            transaction_index: Some(0),
            log_index: Some(index),
            removed: false,
        }
    }

    #[test]
    fn erc20_log_produces_transfer_row_and_count() {
        let token = address!("4200000000000000000000000000000000000006");
        let ev = erc20::Transfer {
            from: address!("1111111111111111111111111111111111111111"),
            to: address!("2222222222222222222222222222222222222222"),
            value: U256::from(1_000u64),
        };
        let log = rpc_log(token, ev.encode_log_data(), 0);

        let mut logs = Vec::new();
        let mut kind_counts = FxHashMap::default();
        let mut emitters = FxHashMap::default();
        let mut transfers = Vec::new();
        let mut nfts = Vec::new();
        let mut swaps = Vec::new();

        process_log(
            &log,
            "0xfallback",
            1,
            &StubResolver,
            &mut logs,
            &mut kind_counts,
            &mut emitters,
            &mut transfers,
            &mut nfts,
            &mut swaps,
        );

        assert_eq!(logs.len(), 1);
        assert_eq!(kind_counts[EventKind::Erc20Transfer.as_str()], 1);
        assert_eq!(transfers.len(), 1);
        assert_eq!(transfers[0].amount, "1000");
        assert_eq!(
            transfers[0].token_address,
            "0x4200000000000000000000000000000000000006"
        );
        assert!(nfts.is_empty());
        assert!(swaps.is_empty());
    }

    #[test]
    fn v3_swap_log_resolves_dex_name() {
        let pool = address!("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let ev = v3::Swap {
            sender: address!("1111111111111111111111111111111111111111"),
            recipient: address!("2222222222222222222222222222222222222222"),
            amount0: I256::try_from(50i64).unwrap(),
            amount1: I256::try_from(-49i64).unwrap(),
            sqrtPriceX96: alloy::primitives::U160::from(1u64),
            liquidity: 7,
            tick: alloy::primitives::aliases::I24::ZERO,
        };
        let log = rpc_log(pool, ev.encode_log_data(), 3);

        let mut logs = Vec::new();
        let mut kind_counts = FxHashMap::default();
        let mut emitters = FxHashMap::default();
        let mut transfers = Vec::new();
        let mut nfts = Vec::new();
        let mut swaps = Vec::new();

        process_log(
            &log,
            "0xfallback",
            1,
            &StubResolver,
            &mut logs,
            &mut kind_counts,
            &mut emitters,
            &mut transfers,
            &mut nfts,
            &mut swaps,
        );

        assert_eq!(kind_counts[EventKind::DexSwapV3.as_str()], 1);
        assert_eq!(swaps.len(), 1);
        assert_eq!(swaps[0].dex_name, "Uniswap V3");
        assert_eq!(swaps[0].amount0_in, "50");
        assert_eq!(swaps[0].amount1_out, "49");
    }

    #[test]
    fn unknown_log_counts_as_other_without_enrichment() {
        let log = rpc_log(
            address!("cccccccccccccccccccccccccccccccccccccccc"),
            alloy::primitives::LogData::new_unchecked(vec![B256::repeat_byte(0x77)], vec![].into()),
            0,
        );

        let mut logs = Vec::new();
        let mut kind_counts = FxHashMap::default();
        let mut emitters = FxHashMap::default();
        let mut transfers = Vec::new();
        let mut nfts = Vec::new();
        let mut swaps = Vec::new();

        process_log(
            &log,
            "0xfallback",
            1,
            &StubResolver,
            &mut logs,
            &mut kind_counts,
            &mut emitters,
            &mut transfers,
            &mut nfts,
            &mut swaps,
        );

        assert_eq!(kind_counts[EventKind::Other.as_str()], 1);
        assert_eq!(logs.len(), 1);
        assert!(transfers.is_empty() && nfts.is_empty() && swaps.is_empty());
    }

    #[test]
    fn tx_type_tags() {
        assert_eq!(tx_type_tag(0), "legacy");
        assert_eq!(tx_type_tag(2), "eip1559");
        assert_eq!(tx_type_tag(0x7E), "deposit");
        assert_eq!(tx_type_tag(99), "unknown");
    }

    #[test]
    fn averages_use_integer_division() {
        assert_eq!(average(U256::from(10u64), 4), "2");
        assert_eq!(average(U256::ZERO, 0), "0");
        assert_eq!(average(U256::from(10u64), 0), "0");
    }

    #[test]
    fn top_contracts_deterministic_order() {
        let mut counts = FxHashMap::default();
        counts.insert("0xbb".to_string(), 5u64);
        counts.insert("0xaa".to_string(), 5u64);
        counts.insert("0xcc".to_string(), 9u64);
        for i in 0..12 {
            counts.insert(format!("0x{i:02}"), 1);
        }
        let top = top_contracts(&counts);
        assert_eq!(top.len(), 10);
        assert_eq!(top[0].address, "0xcc");
        // Tie on 5 resolves by address order.
        assert_eq!(top[1].address, "0xaa");
        assert_eq!(top[2].address, "0xbb");
    }
}
