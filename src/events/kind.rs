use std::fmt;

/// Semantic kind of a log event.
///
/// Every persisted log contributes exactly one event count under its kind;
/// anything outside the recognized set lands in [`EventKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Erc20Transfer,
    Erc721Transfer,
    Erc1155Transfer,
    DexSwapV2,
    DexSwapV3,
    DexSwapAero,
    DexSwapCurve,
    LiquidityAdd,
    LiquidityRemove,
    LiquidityCollect,
    PoolSync,
    PoolCreated,
    Approval,
    WethWrap,
    WethUnwrap,
    UserOperation,
    FlashLoan,
    RewardClaim,
    GaugeDeposit,
    GaugeWithdraw,
    Vote,
    OwnershipChange,
    ContractUpgrade,
    BridgeSend,
    BridgeReceive,
    LendingSupply,
    LendingWithdraw,
    LendingBorrow,
    LendingRepay,
    LendingLiquidation,
    OracleUpdate,
    MultisigExec,
    ProtocolFees,
    Governance,
    Staking,
    NftPositionMint,
    NftPositionBurn,
    Other,
}

impl EventKind {
    /// Stable name used in the `event_counts` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Erc20Transfer => "erc20_transfer",
            Self::Erc721Transfer => "erc721_transfer",
            Self::Erc1155Transfer => "erc1155_transfer",
            Self::DexSwapV2 => "dex_swap_v2",
            Self::DexSwapV3 => "dex_swap_v3",
            Self::DexSwapAero => "dex_swap_aero",
            Self::DexSwapCurve => "dex_swap_curve",
            Self::LiquidityAdd => "liquidity_add",
            Self::LiquidityRemove => "liquidity_remove",
            Self::LiquidityCollect => "liquidity_collect",
            Self::PoolSync => "pool_sync",
            Self::PoolCreated => "pool_created",
            Self::Approval => "approval",
            Self::WethWrap => "weth_wrap",
            Self::WethUnwrap => "weth_unwrap",
            Self::UserOperation => "user_operation",
            Self::FlashLoan => "flash_loan",
            Self::RewardClaim => "reward_claim",
            Self::GaugeDeposit => "gauge_deposit",
            Self::GaugeWithdraw => "gauge_withdraw",
            Self::Vote => "vote",
            Self::OwnershipChange => "ownership_change",
            Self::ContractUpgrade => "contract_upgrade",
            Self::BridgeSend => "bridge_send",
            Self::BridgeReceive => "bridge_receive",
            Self::LendingSupply => "lending_supply",
            Self::LendingWithdraw => "lending_withdraw",
            Self::LendingBorrow => "lending_borrow",
            Self::LendingRepay => "lending_repay",
            Self::LendingLiquidation => "lending_liquidation",
            Self::OracleUpdate => "oracle_update",
            Self::MultisigExec => "multisig_exec",
            Self::ProtocolFees => "protocol_fees",
            Self::Governance => "governance",
            Self::Staking => "staking",
            Self::NftPositionMint => "nft_position_mint",
            Self::NftPositionBurn => "nft_position_burn",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a transaction by `(to, value, input)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxKind {
    ContractCreation,
    EthTransfer,
    ContractCall,
}

impl TxKind {
    /// Stable name; shares the `event_counts` namespace with [`EventKind`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContractCreation => "contract_creation",
            Self::EthTransfer => "eth_transfer",
            Self::ContractCall => "contract_call",
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
