//! Pool → DEX family resolution.
//!
//! Resolution order: singleton contracts, the curated Curve pool set, the
//! in-memory cache (warmed once from the durable `pool_dex_cache` table),
//! then an on-chain `factory()` probe. The probe runs on a detached task fed
//! by an unbounded queue so the block write path never waits on RPC; until
//! the probe lands, swap rows carry a signature-derived fallback name.

use std::sync::Arc;

use alloy::primitives::{address, Address, B256};
use alloy::sol_types::SolEvent;
use log::{debug, info, warn};
use moka::sync::Cache;
use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use crate::abis::{cl, curve, IPoolFactory};
use crate::db::models::PoolDexEntry;
use crate::db::Store;
use crate::rpc::OpProvider;
use crate::utils::address_hex;

/// Non-factory singletons that emit swap events directly.
static SINGLETONS: Lazy<FxHashMap<Address, &'static str>> = Lazy::new(|| {
    FxHashMap::from_iter([(
        // Uniswap V4 PoolManager
        address!("498581ff718922c3f8e6a244956af099b2652b2b"),
        "Uniswap V4",
    )])
});

/// Curated Curve pools on Base. Curve pools expose no `factory()` on the
/// pool itself in older deployments, so they are pinned here.
static CURVE_POOLS: Lazy<Vec<Address>> = Lazy::new(|| {
    vec![
        // 4pool (USDC/crvUSD metapool family)
        address!("f6c5f01c7f3148891ad0e19df78743d31e390d1f"),
        // tricrypto
        address!("6e53131f68a034873b6bfa15502af094ef0c5854"),
    ]
});

/// Known factory → DEX family table for Base.
static FACTORY_TO_DEX: Lazy<FxHashMap<Address, &'static str>> = Lazy::new(|| {
    FxHashMap::from_iter([
        (address!("8909dc15e40173ff4699343b6eb8132c65e18ec6"), "Uniswap V2"),
        (address!("33128a8fc17869897dce68ed026d694621f6fdfd"), "Uniswap V3"),
        (address!("420dd381b31aef6683db6b902084cb0ffece40da"), "Aerodrome V2"),
        (address!("5e7bb104d84c7cb9b682aac2f3d509f5f406809a"), "Aerodrome CL"),
        (address!("71524b4f93c58fcbf659783284e38825f0622859"), "SushiSwap V2"),
        (address!("c35dadb65012ec5796536bd9864ed8773abc74c4"), "SushiSwap V3"),
        (address!("fda619b6d20975be80a10332cd39b9a4b0faa8bb"), "BaseSwap"),
        (address!("0bfbcf9fa4f9c56b0f40a671ad40e0805a091865"), "PancakeSwap V3"),
        (address!("02a84c1b3bbd7401a5f7fa98a384ebc70bb5749e"), "PancakeSwap V2"),
        (address!("3e84d913803b02a4a7f027165e8ca42c14c0fde7"), "AlienBase"),
    ])
});

/// Sync lookup seam between the enricher and the resolver.
pub trait DexLookup {
    /// Resolve a pool to a DEX family name without blocking. A cache miss
    /// returns the signature-derived fallback for this swap variant.
    fn dex_name(&self, pool: &Address, topic0: &B256) -> String;
}

struct ProbeRequest {
    pool: Address,
    topic0: B256,
}

pub struct DexResolver {
    cache: Cache<String, String>,
    probe_tx: mpsc::UnboundedSender<ProbeRequest>,
}

impl DexResolver {
    /// Build the resolver, warm the cache from the durable table, and spawn
    /// the probe task.
    pub fn new(store: Arc<Store>, provider: OpProvider) -> anyhow::Result<Arc<Self>> {
        let cache: Cache<String, String> = Cache::new(100_000);

        let warmed = store.load_pool_dex_cache()?;
        for entry in &warmed {
            cache.insert(entry.pool_address.clone(), entry.dex_name.clone());
        }
        if !warmed.is_empty() {
            info!("Warmed pool/DEX cache with {} entries", warmed.len());
        }

        let (probe_tx, probe_rx) = mpsc::unbounded_channel();
        let resolver = Arc::new(Self { cache, probe_tx });

        tokio::spawn(probe_worker(
            probe_rx,
            store,
            provider,
            resolver.cache.clone(),
        ));

        Ok(resolver)
    }

    /// Signature-derived fallback when the pool is not yet resolved.
    pub fn fallback_name(topic0: &B256) -> &'static str {
        if *topic0 == curve::TokenExchange::SIGNATURE_HASH {
            "Curve"
        } else if *topic0 == cl::Swap::SIGNATURE_HASH {
            "Aerodrome CL"
        } else {
            "Unknown DEX"
        }
    }
}

impl DexLookup for DexResolver {
    fn dex_name(&self, pool: &Address, topic0: &B256) -> String {
        if let Some(name) = SINGLETONS.get(pool) {
            return name.to_string();
        }
        if CURVE_POOLS.contains(pool) {
            return "Curve".to_string();
        }
        let key = address_hex(pool);
        if let Some(name) = self.cache.get(&key) {
            return name;
        }

        // Fire-and-forget; the probe result serves future blocks.
        let _ = self.probe_tx.send(ProbeRequest {
            pool: *pool,
            topic0: *topic0,
        });
        Self::fallback_name(topic0).to_string()
    }
}

/// Detached probe loop. Requests for the same pool are deduplicated by the
/// cache check; processing is sequential so no two probes for one pool ever
/// run concurrently.
async fn probe_worker(
    mut rx: mpsc::UnboundedReceiver<ProbeRequest>,
    store: Arc<Store>,
    provider: OpProvider,
    cache: Cache<String, String>,
) {
    while let Some(req) = rx.recv().await {
        let key = address_hex(&req.pool);
        if cache.contains_key(&key) {
            continue;
        }

        let (name, factory) = match IPoolFactory::new(req.pool, &provider).factory().call().await
        {
            Ok(factory) => {
                let name = FACTORY_TO_DEX
                    .get(&factory)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| unknown_factory_name(&factory));
                (name, Some(address_hex(&factory)))
            }
            Err(e) if is_transient(&e) => {
                debug!("factory() probe for {key} failed transiently: {e}");
                continue;
            }
            // No factory() on the pool: fall back to the swap signature.
            Err(_) => (DexResolver::fallback_name(&req.topic0).to_string(), None),
        };

        cache.insert(key.clone(), name.clone());
        let entry = PoolDexEntry {
            pool_address: key.clone(),
            dex_name: name.clone(),
            factory_address: factory,
        };
        if let Err(e) = store.set_pool_dex(&entry) {
            warn!("Failed to persist pool/DEX entry for {key}: {e}");
        } else {
            debug!("Resolved pool {key} -> {name}");
        }
    }
}

/// Name for a pool whose factory is real but unrecognized.
fn unknown_factory_name(factory: &Address) -> String {
    let hex = address_hex(factory);
    format!("Unknown ({}…)", &hex[..10])
}

/// Network-level failures are retried implicitly by the next cache miss;
/// contract-level failures (revert, missing method, bad return data) are
/// final and resolve via the signature fallback.
fn is_transient(error: &alloy::contract::Error) -> bool {
    match error {
        alloy::contract::Error::TransportError(te) => {
            !matches!(te, alloy::transports::RpcError::ErrorResp(_))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abis::v3;

    #[test]
    fn singleton_and_factory_tables_resolve() {
        let v4 = address!("498581ff718922c3f8e6a244956af099b2652b2b");
        assert_eq!(SINGLETONS.get(&v4), Some(&"Uniswap V4"));

        let uni_v3 = address!("33128a8fc17869897dce68ed026d694621f6fdfd");
        assert_eq!(FACTORY_TO_DEX.get(&uni_v3), Some(&"Uniswap V3"));
    }

    #[test]
    fn fallback_follows_swap_signature() {
        assert_eq!(
            DexResolver::fallback_name(&curve::TokenExchange::SIGNATURE_HASH),
            "Curve"
        );
        assert_eq!(DexResolver::fallback_name(&cl::Swap::SIGNATURE_HASH), "Aerodrome CL");
        assert_eq!(DexResolver::fallback_name(&v3::Swap::SIGNATURE_HASH), "Unknown DEX");
    }

    #[test]
    fn unknown_factory_keeps_a_prefix() {
        let factory = address!("deadbeef00000000000000000000000000000000");
        assert_eq!(unknown_factory_name(&factory), "Unknown (0xdeadbeef…)");
    }
}
