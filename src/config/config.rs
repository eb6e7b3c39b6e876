use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// Ingester configuration, loaded from the environment at startup.
///
/// Every variable except `RPC_URL` has a default; a missing `RPC_URL` is a
/// fatal startup error.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// JSON-RPC endpoint of the Base node.
    pub rpc_url: String,
    /// Idle/backoff sleep in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Do not ingest within this many blocks of the head.
    #[serde(default = "default_safety_buffer_blocks")]
    pub safety_buffer_blocks: u64,
    /// Blocks to rewind when a parent-hash mismatch is detected.
    #[serde(default = "default_reorg_rewind_depth")]
    pub reorg_rewind_depth: u64,
    /// Window size for the stats report.
    #[serde(default = "default_stats_window_blocks")]
    pub stats_window_blocks: u64,
    /// Max concurrent receipt fetches per block on the fan-out path.
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
    /// Store location.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

fn default_poll_interval_ms() -> u64 {
    2_000
}

fn default_safety_buffer_blocks() -> u64 {
    3
}

fn default_reorg_rewind_depth() -> u64 {
    10
}

fn default_stats_window_blocks() -> u64 {
    100
}

fn default_concurrency_limit() -> usize {
    5
}

fn default_db_path() -> String {
    "./data/base.db".to_string()
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Environment::default())
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let settings: Settings = serde_json::from_str(r#"{"rpc_url":"http://localhost:8545"}"#)
            .expect("minimal settings should deserialize");
        assert_eq!(settings.poll_interval_ms, 2_000);
        assert_eq!(settings.safety_buffer_blocks, 3);
        assert_eq!(settings.reorg_rewind_depth, 10);
        assert_eq!(settings.stats_window_blocks, 100);
        assert_eq!(settings.concurrency_limit, 5);
        assert_eq!(settings.db_path, "./data/base.db");
    }

    #[test]
    fn missing_rpc_url_is_an_error() {
        let res: Result<Settings, _> = serde_json::from_str("{}");
        assert!(res.is_err());
    }
}
