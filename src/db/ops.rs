use std::sync::MutexGuard;

use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::db::models::{
    BlockRow, BlockSnapshot, Checkpoint, ContractLabel, PoolDexEntry, TopContract,
};
use crate::db::Store;

/// Totals over a block window, for the stats report.
#[derive(Debug, Clone, Default)]
pub struct WindowTotals {
    pub blocks: u64,
    pub txs: u64,
    pub logs: u64,
    pub total_gas: u64,
    pub swaps: u64,
    pub token_transfers: u64,
    pub nft_transfers: u64,
    pub deployments: u64,
}

/// Log emitter aggregated over a window, joined against the label table.
#[derive(Debug, Clone)]
pub struct EmitterRow {
    pub address: String,
    pub count: u64,
    pub label: Option<String>,
}

impl Store {
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ==================== PER-BLOCK COMMIT ====================

    /// Write everything for one block atomically.
    ///
    /// Primary-keyed tables use insert-or-replace; log-like tables are
    /// cleared for this block number and re-appended, so replaying a block
    /// converges to the same state (surrogate ids aside). The checkpoint
    /// row advances in the same transaction.
    pub fn commit_block(&self, snap: &BlockSnapshot) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let number = snap.block.number;

        tx.execute(
            "INSERT OR REPLACE INTO blocks
             (number, hash, parent_hash, timestamp, gas_used, gas_limit, base_fee, reorged)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)",
            params![
                number,
                snap.block.hash,
                snap.block.parent_hash,
                snap.block.timestamp,
                snap.block.gas_used,
                snap.block.gas_limit,
                snap.block.base_fee,
            ],
        )?;

        for table in [
            "logs",
            "event_counts",
            "token_transfers",
            "nft_transfers",
            "dex_swaps",
            "contract_deployments",
        ] {
            tx.execute(
                &format!("DELETE FROM {table} WHERE block_number = ?1"),
                params![number],
            )?;
        }

        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO transactions
                 (hash, block_number, from_address, to_address, value, input, gas_price,
                  max_fee_per_gas, max_priority_fee_per_gas, gas_used, effective_gas_price, tx_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )?;
            for t in &snap.transactions {
                stmt.execute(params![
                    t.hash,
                    t.block_number,
                    t.from_address,
                    t.to_address,
                    t.value,
                    t.input,
                    t.gas_price,
                    t.max_fee_per_gas,
                    t.max_priority_fee_per_gas,
                    t.gas_used,
                    t.effective_gas_price,
                    t.tx_type,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO receipts
                 (tx_hash, block_number, status, gas_used, log_count, contract_address,
                  effective_gas_price, l1_fee)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for r in &snap.receipts {
                stmt.execute(params![
                    r.tx_hash,
                    r.block_number,
                    r.status,
                    r.gas_used,
                    r.log_count,
                    r.contract_address,
                    r.effective_gas_price,
                    r.l1_fee,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO logs
                 (tx_hash, block_number, log_index, address, topic0, topic1, topic2, topic3, data)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for l in &snap.logs {
                stmt.execute(params![
                    l.tx_hash,
                    l.block_number,
                    l.log_index,
                    l.address,
                    l.topic0,
                    l.topic1,
                    l.topic2,
                    l.topic3,
                    l.data,
                ])?;
            }
        }

        let top_contracts = serde_json::to_string(&snap.metrics.top_contracts)
            .unwrap_or_else(|_| "[]".to_string());
        tx.execute(
            "INSERT OR REPLACE INTO block_metrics
             (block_number, tx_count, log_count, total_gas_used, avg_gas_per_tx, top_contracts,
              unique_senders, unique_recipients, avg_gas_price, avg_priority_fee)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                snap.metrics.block_number,
                snap.metrics.tx_count,
                snap.metrics.log_count,
                snap.metrics.total_gas_used,
                snap.metrics.avg_gas_per_tx,
                top_contracts,
                snap.metrics.unique_senders,
                snap.metrics.unique_recipients,
                snap.metrics.avg_gas_price,
                snap.metrics.avg_priority_fee,
            ],
        )?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO event_counts (block_number, kind, count) VALUES (?1, ?2, ?3)",
            )?;
            for c in &snap.event_counts {
                stmt.execute(params![c.block_number, c.kind, c.count])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO token_transfers
                 (tx_hash, block_number, log_index, token_address, from_address, to_address, amount)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for t in &snap.token_transfers {
                stmt.execute(params![
                    t.tx_hash,
                    t.block_number,
                    t.log_index,
                    t.token_address,
                    t.from_address,
                    t.to_address,
                    t.amount,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO nft_transfers
                 (tx_hash, block_number, log_index, token_address, from_address, to_address,
                  token_id, amount, standard)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for t in &snap.nft_transfers {
                stmt.execute(params![
                    t.tx_hash,
                    t.block_number,
                    t.log_index,
                    t.token_address,
                    t.from_address,
                    t.to_address,
                    t.token_id,
                    t.amount,
                    t.standard,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO dex_swaps
                 (tx_hash, block_number, log_index, pool_address, dex_name, sender, recipient,
                  amount0_in, amount1_in, amount0_out, amount1_out)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for s in &snap.dex_swaps {
                stmt.execute(params![
                    s.tx_hash,
                    s.block_number,
                    s.log_index,
                    s.pool_address,
                    s.dex_name,
                    s.sender,
                    s.recipient,
                    s.amount0_in,
                    s.amount1_in,
                    s.amount0_out,
                    s.amount1_out,
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                "INSERT OR REPLACE INTO contract_deployments
                 (tx_hash, block_number, deployer, contract_address)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for d in &snap.deployments {
                stmt.execute(params![
                    d.tx_hash,
                    d.block_number,
                    d.deployer,
                    d.contract_address,
                ])?;
            }
        }

        let cp = Checkpoint::new(number);
        tx.execute(
            "INSERT OR REPLACE INTO checkpoint (id, block_number, updated_at) VALUES (0, ?1, ?2)",
            params![cp.block_number, cp.updated_at.to_rfc3339()],
        )?;

        tx.commit()
    }

    // ==================== CHECKPOINT ====================

    pub fn checkpoint(&self) -> Result<Option<u64>> {
        self.lock()
            .query_row("SELECT block_number FROM checkpoint WHERE id = 0", [], |row| {
                row.get(0)
            })
            .optional()
    }

    pub fn set_checkpoint(&self, block_number: u64) -> Result<()> {
        let cp = Checkpoint::new(block_number);
        self.lock().execute(
            "INSERT OR REPLACE INTO checkpoint (id, block_number, updated_at) VALUES (0, ?1, ?2)",
            params![cp.block_number, cp.updated_at.to_rfc3339()],
        )?;
        Ok(())
    }

    // ==================== REORG SUPPORT ====================

    /// Non-reorged block at `number`, if any.
    pub fn block_by_number(&self, number: u64) -> Result<Option<BlockRow>> {
        self.lock()
            .query_row(
                "SELECT number, hash, parent_hash, timestamp, gas_used, gas_limit, base_fee, reorged
                 FROM blocks WHERE number = ?1 AND reorged = 0",
                params![number],
                |row| {
                    Ok(BlockRow {
                        number: row.get(0)?,
                        hash: row.get(1)?,
                        parent_hash: row.get(2)?,
                        timestamp: row.get(3)?,
                        gas_used: row.get(4)?,
                        gas_limit: row.get(5)?,
                        base_fee: row.get(6)?,
                        reorged: row.get(7)?,
                    })
                },
            )
            .optional()
    }

    /// Flag every block at or above `from` as reorged. Returns the number of
    /// blocks flagged.
    pub fn mark_reorged(&self, from: u64) -> Result<usize> {
        self.lock().execute(
            "UPDATE blocks SET reorged = 1 WHERE number >= ?1",
            params![from],
        )
    }

    /// Delete all derived state at or above `from`, in one transaction.
    /// Blocks themselves are kept (flagged by [`Store::mark_reorged`]).
    pub fn rewind(&self, from: u64) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        for table in [
            "logs",
            "receipts",
            "transactions",
            "block_metrics",
            "event_counts",
            "token_transfers",
            "nft_transfers",
            "dex_swaps",
            "contract_deployments",
        ] {
            tx.execute(
                &format!("DELETE FROM {table} WHERE block_number >= ?1"),
                params![from],
            )?;
        }
        tx.commit()
    }

    // ==================== POOL/DEX CACHE ====================

    pub fn set_pool_dex(&self, entry: &PoolDexEntry) -> Result<()> {
        self.lock().execute(
            "INSERT OR REPLACE INTO pool_dex_cache (pool_address, dex_name, factory_address)
             VALUES (?1, ?2, ?3)",
            params![entry.pool_address, entry.dex_name, entry.factory_address],
        )?;
        Ok(())
    }

    pub fn load_pool_dex_cache(&self) -> Result<Vec<PoolDexEntry>> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT pool_address, dex_name, factory_address FROM pool_dex_cache")?;
        let rows = stmt.query_map([], |row| {
            Ok(PoolDexEntry {
                pool_address: row.get(0)?,
                dex_name: row.get(1)?,
                factory_address: row.get(2)?,
            })
        })?;
        rows.collect()
    }

    // ==================== CONTRACT LABELS ====================

    /// Insert-or-ignore the seed labels. Returns how many were new.
    pub fn seed_labels(&self, labels: &[ContractLabel]) -> Result<usize> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO contract_labels (address, name, category, protocol)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for l in labels {
                inserted += stmt.execute(params![l.address, l.name, l.category, l.protocol])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    // ==================== STATS (read-only) ====================

    pub fn window_totals(&self, from: u64, to: u64) -> Result<WindowTotals> {
        let conn = self.lock();
        let (blocks, txs, logs, total_gas) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(tx_count), 0), COALESCE(SUM(log_count), 0),
                    COALESCE(SUM(total_gas_used), 0)
             FROM block_metrics WHERE block_number BETWEEN ?1 AND ?2",
            params![from, to],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )?;
        let count_in = |table: &str| -> Result<u64> {
            conn.query_row(
                &format!("SELECT COUNT(*) FROM {table} WHERE block_number BETWEEN ?1 AND ?2"),
                params![from, to],
                |row| row.get(0),
            )
        };
        Ok(WindowTotals {
            blocks,
            txs,
            logs,
            total_gas,
            swaps: count_in("dex_swaps")?,
            token_transfers: count_in("token_transfers")?,
            nft_transfers: count_in("nft_transfers")?,
            deployments: count_in("contract_deployments")?,
        })
    }

    pub fn event_kind_totals(&self, from: u64, to: u64) -> Result<Vec<(String, u64)>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT kind, SUM(count) FROM event_counts
             WHERE block_number BETWEEN ?1 AND ?2
             GROUP BY kind ORDER BY SUM(count) DESC, kind ASC",
        )?;
        let rows = stmt.query_map(params![from, to], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect()
    }

    pub fn dex_swap_totals(&self, from: u64, to: u64) -> Result<Vec<(String, u64)>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT dex_name, COUNT(*) FROM dex_swaps
             WHERE block_number BETWEEN ?1 AND ?2
             GROUP BY dex_name ORDER BY COUNT(*) DESC, dex_name ASC",
        )?;
        let rows = stmt.query_map(params![from, to], |row| Ok((row.get(0)?, row.get(1)?)))?;
        rows.collect()
    }

    pub fn top_emitters(&self, from: u64, to: u64, limit: u64) -> Result<Vec<EmitterRow>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT l.address, COUNT(*) AS cnt, cl.name
             FROM logs l LEFT JOIN contract_labels cl ON cl.address = l.address
             WHERE l.block_number BETWEEN ?1 AND ?2
             GROUP BY l.address ORDER BY cnt DESC, l.address ASC LIMIT ?3",
        )?;
        let rows = stmt.query_map(params![from, to, limit], |row| {
            Ok(EmitterRow {
                address: row.get(0)?,
                count: row.get(1)?,
                label: row.get(2)?,
            })
        })?;
        rows.collect()
    }

    #[cfg(test)]
    pub(crate) fn table_count(&self, table: &str, at_or_above: u64) -> Result<u64> {
        self.lock().query_row(
            &format!("SELECT COUNT(*) FROM {table} WHERE block_number >= ?1"),
            params![at_or_above],
            |row| row.get(0),
        )
    }
}

/// Decode the JSON-encoded top-contracts column.
pub fn parse_top_contracts(raw: &str) -> Vec<TopContract> {
    serde_json::from_str(raw).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{
        BlockMetrics, ContractDeployment, DexSwap, EventCount, LogRow, NftTransfer, ReceiptRow,
        TokenTransfer, TxRow,
    };

    fn snapshot(number: u64, hash: &str, parent: &str) -> BlockSnapshot {
        let tx_hash = format!("0xt{number:05}");
        BlockSnapshot {
            block: BlockRow {
                number,
                hash: hash.to_string(),
                parent_hash: parent.to_string(),
                timestamp: 1_700_000_000 + number,
                gas_used: 21_000,
                gas_limit: 30_000_000,
                base_fee: Some(50),
                reorged: false,
            },
            transactions: vec![TxRow {
                hash: tx_hash.clone(),
                block_number: number,
                from_address: "0xaaaa".into(),
                to_address: Some("0xbbbb".into()),
                value: "1".into(),
                input: vec![],
                gas_price: None,
                max_fee_per_gas: Some("100".into()),
                max_priority_fee_per_gas: Some("2".into()),
                gas_used: Some(21_000),
                effective_gas_price: Some("52".into()),
                tx_type: "eip1559".into(),
            }],
            receipts: vec![ReceiptRow {
                tx_hash: tx_hash.clone(),
                block_number: number,
                status: true,
                gas_used: 21_000,
                log_count: 2,
                contract_address: None,
                effective_gas_price: "52".into(),
                l1_fee: Some("31337".into()),
            }],
            logs: vec![
                LogRow {
                    tx_hash: tx_hash.clone(),
                    block_number: number,
                    log_index: 0,
                    address: "0xc0ffee".into(),
                    topic0: Some("0x01".into()),
                    topic1: None,
                    topic2: None,
                    topic3: None,
                    data: vec![0u8; 32],
                },
                LogRow {
                    tx_hash: tx_hash.clone(),
                    block_number: number,
                    log_index: 1,
                    address: "0xc0ffee".into(),
                    topic0: Some("0x02".into()),
                    topic1: None,
                    topic2: None,
                    topic3: None,
                    data: vec![],
                },
            ],
            metrics: BlockMetrics {
                block_number: number,
                tx_count: 1,
                log_count: 2,
                total_gas_used: 21_000,
                avg_gas_per_tx: 21_000,
                top_contracts: vec![TopContract {
                    address: "0xc0ffee".into(),
                    count: 2,
                }],
                unique_senders: 1,
                unique_recipients: 1,
                avg_gas_price: "52".into(),
                avg_priority_fee: "2".into(),
            },
            event_counts: vec![
                EventCount {
                    block_number: number,
                    kind: "other".into(),
                    count: 2,
                },
                EventCount {
                    block_number: number,
                    kind: "eth_transfer".into(),
                    count: 1,
                },
            ],
            token_transfers: vec![TokenTransfer {
                tx_hash: tx_hash.clone(),
                block_number: number,
                log_index: 0,
                token_address: "0xdddd".into(),
                from_address: "0xaaaa".into(),
                to_address: "0xbbbb".into(),
                amount: "10".into(),
            }],
            nft_transfers: vec![NftTransfer {
                tx_hash: tx_hash.clone(),
                block_number: number,
                log_index: 1,
                token_address: "0xeeee".into(),
                from_address: "0xaaaa".into(),
                to_address: "0xbbbb".into(),
                token_id: "5".into(),
                amount: "1".into(),
                standard: "ERC721".into(),
            }],
            dex_swaps: vec![DexSwap {
                tx_hash: tx_hash.clone(),
                block_number: number,
                log_index: 0,
                pool_address: "0xp001".into(),
                dex_name: "Uniswap V3".into(),
                sender: "0xaaaa".into(),
                recipient: "0xbbbb".into(),
                amount0_in: "1".into(),
                amount1_in: "0".into(),
                amount0_out: "0".into(),
                amount1_out: "1".into(),
            }],
            deployments: vec![ContractDeployment {
                tx_hash,
                block_number: number,
                deployer: "0xaaaa".into(),
                contract_address: "0xffff".into(),
            }],
        }
    }

    #[test]
    fn commit_advances_checkpoint() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.checkpoint().unwrap(), None);
        store.commit_block(&snapshot(98, "0x98", "0x97")).unwrap();
        assert_eq!(store.checkpoint().unwrap(), Some(98));
    }

    #[test]
    fn replay_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        let snap = snapshot(98, "0x98", "0x97");
        store.commit_block(&snap).unwrap();
        store.commit_block(&snap).unwrap();

        for table in [
            "transactions",
            "receipts",
            "logs",
            "block_metrics",
            "event_counts",
            "token_transfers",
            "nft_transfers",
            "dex_swaps",
            "contract_deployments",
        ] {
            assert_eq!(
                store.table_count(table, 0).unwrap(),
                match table {
                    "logs" | "event_counts" => 2,
                    _ => 1,
                },
                "table {table} should not grow on replay"
            );
        }
        let block = store.block_by_number(98).unwrap().unwrap();
        assert_eq!(block.hash, "0x98");
        assert_eq!(store.checkpoint().unwrap(), Some(98));
    }

    #[test]
    fn rewind_clears_derived_state_and_keeps_flagged_blocks() {
        let store = Store::open_in_memory().unwrap();
        for n in 88..=100u64 {
            store
                .commit_block(&snapshot(n, &format!("0x{n:02x}"), &format!("0x{:02x}", n - 1)))
                .unwrap();
        }

        // Parent-hash mismatch detected while probing block 101: rewind to 91.
        store.mark_reorged(91).unwrap();
        store.rewind(91).unwrap();
        store.set_checkpoint(90).unwrap();

        for table in [
            "logs",
            "receipts",
            "transactions",
            "block_metrics",
            "event_counts",
            "token_transfers",
            "nft_transfers",
            "dex_swaps",
            "contract_deployments",
        ] {
            assert_eq!(store.table_count(table, 91).unwrap(), 0, "{table} not cleared");
        }

        // Blocks above the rewind point are flagged, not deleted.
        assert!(store.block_by_number(95).unwrap().is_none());
        assert!(store.block_by_number(90).unwrap().is_some());
        assert_eq!(store.checkpoint().unwrap(), Some(90));

        // Pre-rewind state is untouched.
        assert_eq!(store.table_count("transactions", 0).unwrap(), 3); // 88, 89, 90
    }

    #[test]
    fn reingesting_after_rewind_unflags_the_block() {
        let store = Store::open_in_memory().unwrap();
        store.commit_block(&snapshot(95, "0xaa", "0x94")).unwrap();
        store.mark_reorged(95).unwrap();
        store.rewind(95).unwrap();
        assert!(store.block_by_number(95).unwrap().is_none());

        store.commit_block(&snapshot(95, "0xbb", "0x94")).unwrap();
        let block = store.block_by_number(95).unwrap().unwrap();
        assert_eq!(block.hash, "0xbb");
        assert!(!block.reorged);
    }

    #[test]
    fn pool_dex_cache_round_trip() {
        let store = Store::open_in_memory().unwrap();
        let entry = PoolDexEntry {
            pool_address: "0xpool".into(),
            dex_name: "Aerodrome V2".into(),
            factory_address: Some("0xfactory".into()),
        };
        store.set_pool_dex(&entry).unwrap();
        // Duplicate insert is idempotent.
        store.set_pool_dex(&entry).unwrap();
        let cached = store.load_pool_dex_cache().unwrap();
        assert_eq!(cached, vec![entry]);
    }

    #[test]
    fn label_seeding_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        let labels = vec![ContractLabel::new("0xABCD", "WETH", "token", "Canonical")];
        assert_eq!(store.seed_labels(&labels).unwrap(), 1);
        assert_eq!(store.seed_labels(&labels).unwrap(), 0);
    }

    #[test]
    fn window_totals_aggregate() {
        let store = Store::open_in_memory().unwrap();
        for n in 1..=3u64 {
            store
                .commit_block(&snapshot(n, &format!("0x{n}"), &format!("0x{}", n - 1)))
                .unwrap();
        }
        let totals = store.window_totals(1, 3).unwrap();
        assert_eq!(totals.blocks, 3);
        assert_eq!(totals.txs, 3);
        assert_eq!(totals.logs, 6);
        assert_eq!(totals.swaps, 3);

        let kinds = store.event_kind_totals(1, 3).unwrap();
        assert_eq!(kinds[0], ("other".to_string(), 6));
        assert_eq!(kinds[1], ("eth_transfer".to_string(), 3));
    }

    #[test]
    fn top_contracts_json_round_trip() {
        let parsed = parse_top_contracts(r#"[{"address":"0xc0ffee","count":2}]"#);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].count, 2);
        assert!(parse_top_contracts("garbage").is_empty());
    }
}
