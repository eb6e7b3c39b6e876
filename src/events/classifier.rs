//! Log and transaction classification.
//!
//! Classification is total: every log maps to exactly one [`EventKind`] and
//! every transaction to exactly one [`TxKind`].

use alloy::primitives::{B256, U256};

use crate::events::kind::{EventKind, TxKind};
use crate::events::registry::{self, TRANSFER_TOPIC};

/// Classify a log by `(topic0, topicCount)`.
///
/// The ERC-20 and ERC-721 `Transfer` events share a topic0; an indexed
/// tokenId means four non-null topics, so exactly four topics classifies as
/// ERC-721 and anything else as ERC-20.
pub fn classify_log(topic0: Option<&B256>, topic_count: usize) -> EventKind {
    let Some(topic0) = topic0 else {
        return EventKind::Other;
    };

    if *topic0 == TRANSFER_TOPIC {
        return if topic_count == 4 {
            EventKind::Erc721Transfer
        } else {
            EventKind::Erc20Transfer
        };
    }

    registry::lookup(topic0).unwrap_or(EventKind::Other)
}

/// Classify a transaction by `(to, value, input)`.
pub fn classify_tx(to_is_some: bool, value: U256, input: &[u8]) -> TxKind {
    if !to_is_some {
        TxKind::ContractCreation
    } else if value > U256::ZERO && input.is_empty() {
        TxKind::EthTransfer
    } else {
        TxKind::ContractCall
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abis::{curve, v2};
    use alloy::sol_types::SolEvent;

    #[test]
    fn transfer_tie_break_by_topic_count() {
        assert_eq!(
            classify_log(Some(&TRANSFER_TOPIC), 4),
            EventKind::Erc721Transfer
        );
        assert_eq!(
            classify_log(Some(&TRANSFER_TOPIC), 3),
            EventKind::Erc20Transfer
        );
        // Non-standard emitters with fewer topics still count as ERC-20.
        assert_eq!(
            classify_log(Some(&TRANSFER_TOPIC), 1),
            EventKind::Erc20Transfer
        );
    }

    #[test]
    fn registered_topics_classify() {
        assert_eq!(
            classify_log(Some(&v2::Swap::SIGNATURE_HASH), 3),
            EventKind::DexSwapV2
        );
        assert_eq!(
            classify_log(Some(&curve::TokenExchange::SIGNATURE_HASH), 2),
            EventKind::DexSwapCurve
        );
    }

    #[test]
    fn unknown_and_missing_topics_are_other() {
        assert_eq!(classify_log(Some(&B256::ZERO), 3), EventKind::Other);
        assert_eq!(classify_log(None, 0), EventKind::Other);
    }

    #[test]
    fn tx_classification() {
        assert_eq!(
            classify_tx(false, U256::ZERO, &[0x60, 0x80]),
            TxKind::ContractCreation
        );
        assert_eq!(classify_tx(true, U256::from(1), &[]), TxKind::EthTransfer);
        // Zero value with empty input is a plain call, not a transfer.
        assert_eq!(classify_tx(true, U256::ZERO, &[]), TxKind::ContractCall);
        assert_eq!(
            classify_tx(true, U256::from(1), &[0xa9, 0x05, 0x9c, 0xbb]),
            TxKind::ContractCall
        );
    }
}
