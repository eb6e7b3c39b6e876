//! Canonical event signature registry.
//!
//! Maps topic0 hashes to their semantic [`EventKind`]. Decodable events come
//! straight from the `sol!` declarations in [`crate::abis`]; the long tail of
//! recognized-but-not-decoded events is hashed from canonical signature
//! strings once, on first access. A handful of signatures whose preimage we
//! never reconstructed are declared by literal topic0.

use alloy::primitives::{b256, keccak256, B256};
use alloy::sol_types::SolEvent;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use crate::abis::{aero, cl, curve, erc1155, erc20, erc721, v2, v3, weth};
use crate::events::kind::EventKind;

/// Shared topic0 of the ERC-20 and ERC-721 `Transfer` events. The registry
/// cannot resolve this one alone; the classifier breaks the tie by topic
/// count.
pub const TRANSFER_TOPIC: B256 = erc20::Transfer::SIGNATURE_HASH;

// Observed on Base; registered by literal topic0.
const USER_OPERATION_EVENT: B256 =
    b256!("49628fd1471006c1482da88028e9ce4dbb080b815c9b0344d39e5a8e6ec1419f");
const CHAINLINK_ANSWER_UPDATED: B256 =
    b256!("0559884fd3a460db3073b7fc896cc77986f16e378210ded43186175bf646fc5f");
const SAFE_EXECUTION_SUCCESS: B256 =
    b256!("442e715f626346e8c54381002da614f62bee8d27386535b2521ec8540898556e");
const SAFE_EXECUTION_FAILURE: B256 =
    b256!("23428b18acfb3ea64b08dc0c1d296ea9c09702c09083ca5272e64d115b687d23");

fn sig(signature: &str) -> B256 {
    keccak256(signature.as_bytes())
}

static SIGNATURE_TABLE: Lazy<FxHashMap<B256, EventKind>> = Lazy::new(|| {
    let mut table = FxHashMap::default();

    // ==================== DECODABLE (sol! declarations) ====================
    table.insert(erc1155::TransferSingle::SIGNATURE_HASH, EventKind::Erc1155Transfer);
    table.insert(erc1155::TransferBatch::SIGNATURE_HASH, EventKind::Erc1155Transfer);
    table.insert(v2::Swap::SIGNATURE_HASH, EventKind::DexSwapV2);
    table.insert(v3::Swap::SIGNATURE_HASH, EventKind::DexSwapV3);
    table.insert(cl::Swap::SIGNATURE_HASH, EventKind::DexSwapV3);
    table.insert(aero::Swap::SIGNATURE_HASH, EventKind::DexSwapAero);
    table.insert(curve::TokenExchange::SIGNATURE_HASH, EventKind::DexSwapCurve);

    // ==================== LIQUIDITY & POOL LIFECYCLE ====================
    table.insert(v2::Mint::SIGNATURE_HASH, EventKind::LiquidityAdd);
    table.insert(v3::Mint::SIGNATURE_HASH, EventKind::LiquidityAdd);
    table.insert(v2::Burn::SIGNATURE_HASH, EventKind::LiquidityRemove);
    table.insert(v3::Burn::SIGNATURE_HASH, EventKind::LiquidityRemove);
    table.insert(v3::Collect::SIGNATURE_HASH, EventKind::LiquidityCollect);
    table.insert(v2::Sync::SIGNATURE_HASH, EventKind::PoolSync);
    table.insert(v2::PairCreated::SIGNATURE_HASH, EventKind::PoolCreated);
    table.insert(v3::PoolCreated::SIGNATURE_HASH, EventKind::PoolCreated);

    // ==================== APPROVALS & WETH ====================
    table.insert(erc20::Approval::SIGNATURE_HASH, EventKind::Approval);
    table.insert(erc721::ApprovalForAll::SIGNATURE_HASH, EventKind::Approval);
    table.insert(weth::Deposit::SIGNATURE_HASH, EventKind::WethWrap);
    table.insert(weth::Withdrawal::SIGNATURE_HASH, EventKind::WethUnwrap);

    // ==================== LENDING (Aave V3 pool) ====================
    table.insert(sig("Supply(address,address,address,uint256,uint16)"), EventKind::LendingSupply);
    table.insert(sig("Withdraw(address,address,address,uint256)"), EventKind::LendingWithdraw);
    table.insert(
        sig("Borrow(address,address,address,uint256,uint8,uint256,uint16)"),
        EventKind::LendingBorrow,
    );
    table.insert(sig("Repay(address,address,address,uint256,bool)"), EventKind::LendingRepay);
    table.insert(
        sig("LiquidationCall(address,address,address,uint256,uint256,address,bool)"),
        EventKind::LendingLiquidation,
    );
    table.insert(
        sig("FlashLoan(address,address,address,uint256,uint8,uint256,uint16)"),
        EventKind::FlashLoan,
    );

    // ==================== BRIDGING (OP Stack standard bridge) ====================
    table.insert(sig("SentMessage(address,address,bytes,uint256,uint256)"), EventKind::BridgeSend);
    table.insert(sig("RelayedMessage(bytes32)"), EventKind::BridgeReceive);
    table.insert(
        sig("WithdrawalInitiated(address,address,address,address,uint256,bytes)"),
        EventKind::BridgeSend,
    );
    table.insert(
        sig("DepositFinalized(address,address,address,address,uint256,bytes)"),
        EventKind::BridgeReceive,
    );
    table.insert(sig("ETHBridgeInitiated(address,address,uint256,bytes)"), EventKind::BridgeSend);
    table.insert(sig("ETHBridgeFinalized(address,address,uint256,bytes)"), EventKind::BridgeReceive);
    table.insert(
        sig("ERC20BridgeInitiated(address,address,address,address,uint256,bytes)"),
        EventKind::BridgeSend,
    );
    table.insert(
        sig("ERC20BridgeFinalized(address,address,address,address,uint256,bytes)"),
        EventKind::BridgeReceive,
    );

    // ==================== GAUGES, VOTING, STAKING ====================
    table.insert(sig("Deposit(address,address,uint256)"), EventKind::GaugeDeposit);
    table.insert(sig("Withdraw(address,uint256)"), EventKind::GaugeWithdraw);
    table.insert(sig("ClaimRewards(address,uint256)"), EventKind::RewardClaim);
    table.insert(sig("RewardPaid(address,uint256)"), EventKind::RewardClaim);
    table.insert(
        sig("Voted(address,address,uint256,uint256,uint256,uint256)"),
        EventKind::Vote,
    );
    table.insert(
        sig("Abstained(address,address,uint256,uint256,uint256,uint256)"),
        EventKind::Vote,
    );
    table.insert(sig("Staked(address,uint256)"), EventKind::Staking);
    table.insert(sig("Withdrawn(address,uint256)"), EventKind::Staking);

    // ==================== GOVERNANCE ====================
    table.insert(
        sig("ProposalCreated(uint256,address,address[],uint256[],string[],bytes[],uint256,uint256,string)"),
        EventKind::Governance,
    );
    table.insert(sig("VoteCast(address,uint256,uint8,uint256,string)"), EventKind::Governance);
    table.insert(sig("ProposalExecuted(uint256)"), EventKind::Governance);

    // ==================== ADMINISTRATIVE ====================
    table.insert(sig("OwnershipTransferred(address,address)"), EventKind::OwnershipChange);
    table.insert(sig("Upgraded(address)"), EventKind::ContractUpgrade);
    table.insert(sig("AdminChanged(address,address)"), EventKind::ContractUpgrade);
    table.insert(sig("BeaconUpgraded(address)"), EventKind::ContractUpgrade);

    // ==================== FEES, ORACLES, POSITIONS ====================
    table.insert(sig("CollectProtocol(address,address,uint128,uint128)"), EventKind::ProtocolFees);
    table.insert(sig("Fees(address,uint256,uint256)"), EventKind::ProtocolFees);
    table.insert(
        sig("IncreaseLiquidity(uint256,uint128,uint256,uint256)"),
        EventKind::NftPositionMint,
    );
    table.insert(
        sig("DecreaseLiquidity(uint256,uint128,uint256,uint256)"),
        EventKind::NftPositionBurn,
    );

    // ==================== LITERAL TOPIC0 ====================
    table.insert(USER_OPERATION_EVENT, EventKind::UserOperation);
    table.insert(CHAINLINK_ANSWER_UPDATED, EventKind::OracleUpdate);
    table.insert(SAFE_EXECUTION_SUCCESS, EventKind::MultisigExec);
    table.insert(SAFE_EXECUTION_FAILURE, EventKind::MultisigExec);

    table
});

/// Look up the kind registered for a topic0.
///
/// Returns `None` for the shared `Transfer` topic0 as well as for unknown
/// signatures; the classifier owns the tie-break and the `other` fallback.
pub fn lookup(topic0: &B256) -> Option<EventKind> {
    SIGNATURE_TABLE.get(topic0).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_topic_matches_canonical_hash() {
        // keccak256("Transfer(address,address,uint256)")
        assert_eq!(
            TRANSFER_TOPIC,
            b256!("ddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef")
        );
        // ERC-721 declares the same canonical signature.
        assert_eq!(erc721::Transfer::SIGNATURE_HASH, TRANSFER_TOPIC);
    }

    #[test]
    fn transfer_topic_is_not_in_the_table() {
        assert_eq!(lookup(&TRANSFER_TOPIC), None);
    }

    #[test]
    fn swap_variants_have_distinct_topics() {
        let topics = [
            v2::Swap::SIGNATURE_HASH,
            v3::Swap::SIGNATURE_HASH,
            cl::Swap::SIGNATURE_HASH,
            aero::Swap::SIGNATURE_HASH,
            curve::TokenExchange::SIGNATURE_HASH,
        ];
        for (i, a) in topics.iter().enumerate() {
            for b in topics.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(
            v2::Swap::SIGNATURE_HASH,
            b256!("d78ad95fa46c994b6551d0da85fc275fe613ce37657fb8d5e3d130840159d822")
        );
        assert_eq!(
            v3::Swap::SIGNATURE_HASH,
            b256!("c42079f94a6350d7e6235f29174924f928cc2ac818eb64fed8004e115fbcca67")
        );
    }

    #[test]
    fn erc1155_variants_collapse_to_one_kind() {
        assert_eq!(
            lookup(&erc1155::TransferSingle::SIGNATURE_HASH),
            Some(EventKind::Erc1155Transfer)
        );
        assert_eq!(
            lookup(&erc1155::TransferBatch::SIGNATURE_HASH),
            Some(EventKind::Erc1155Transfer)
        );
    }

    #[test]
    fn computed_signatures_resolve() {
        assert_eq!(
            lookup(&sig("Supply(address,address,address,uint256,uint16)")),
            Some(EventKind::LendingSupply)
        );
        assert_eq!(lookup(&sig("OwnershipTransferred(address,address)")), Some(EventKind::OwnershipChange));
    }

    #[test]
    fn literal_entries_resolve() {
        assert_eq!(lookup(&USER_OPERATION_EVENT), Some(EventKind::UserOperation));
        assert_eq!(lookup(&SAFE_EXECUTION_FAILURE), Some(EventKind::MultisigExec));
    }

    #[test]
    fn unknown_topic_is_unregistered() {
        assert_eq!(lookup(&B256::ZERO), None);
    }
}
