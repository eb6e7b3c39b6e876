pub mod abis;
pub mod config;
pub mod db;
pub mod dex;
pub mod error;
pub mod events;
pub mod labels;
pub mod rpc;
pub mod stats;
pub mod utils;
pub mod worker;

pub use config::Settings;
pub use db::Store;
pub use dex::DexResolver;
pub use error::IngestError;
pub use rpc::Fetcher;
pub use worker::{Poller, ReorgController};
