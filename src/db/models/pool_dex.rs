/// Durable `(pool → DEX family)` cache entry, with the factory address that
/// resolved it when one was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolDexEntry {
    pub pool_address: String,
    pub dex_name: String,
    pub factory_address: Option<String>,
}
