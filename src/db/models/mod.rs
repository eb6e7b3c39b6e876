mod block;
mod checkpoint;
mod deployment;
mod label;
mod log;
mod metrics;
mod pool_dex;
mod receipt;
mod snapshot;
mod swap;
mod transaction;
mod transfer;

pub use block::BlockRow;
pub use checkpoint::Checkpoint;
pub use deployment::ContractDeployment;
pub use label::ContractLabel;
pub use log::LogRow;
pub use metrics::{BlockMetrics, EventCount, TopContract};
pub use pool_dex::PoolDexEntry;
pub use receipt::ReceiptRow;
pub use snapshot::BlockSnapshot;
pub use swap::DexSwap;
pub use transaction::TxRow;
pub use transfer::{NftTransfer, TokenTransfer};
