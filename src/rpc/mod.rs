mod fetcher;

pub use fetcher::{build_provider, Fetcher, OpBlock, OpProvider, OpReceipt, OpTx};
