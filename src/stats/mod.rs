//! Read-only stats report over the store.
//!
//! Renders window aggregates for the last `STATS_WINDOW_BLOCKS` committed
//! blocks. Runs against the same WAL-mode file the ingester writes.

use std::fmt::Write;

use crate::db::Store;

pub fn render(store: &Store, window: u64) -> anyhow::Result<String> {
    let Some(checkpoint) = store.checkpoint()? else {
        return Ok("No checkpoint yet; the store is empty.\n".to_string());
    };

    let from = checkpoint.saturating_sub(window.saturating_sub(1));
    let totals = store.window_totals(from, checkpoint)?;
    let kinds = store.event_kind_totals(from, checkpoint)?;
    let dexes = store.dex_swap_totals(from, checkpoint)?;
    let emitters = store.top_emitters(from, checkpoint, 10)?;

    let mut out = String::new();
    writeln!(out, "basewatch stats — blocks {from}..={checkpoint}")?;
    writeln!(out)?;
    writeln!(out, "  blocks            {:>12}", totals.blocks)?;
    writeln!(out, "  transactions      {:>12}", totals.txs)?;
    writeln!(out, "  logs              {:>12}", totals.logs)?;
    writeln!(out, "  gas used          {:>12}", totals.total_gas)?;
    writeln!(out, "  dex swaps         {:>12}", totals.swaps)?;
    writeln!(out, "  token transfers   {:>12}", totals.token_transfers)?;
    writeln!(out, "  nft transfers     {:>12}", totals.nft_transfers)?;
    writeln!(out, "  deployments       {:>12}", totals.deployments)?;

    if !kinds.is_empty() {
        writeln!(out)?;
        writeln!(out, "event kinds:")?;
        for (kind, count) in kinds.iter().take(15) {
            writeln!(out, "  {kind:<24} {count:>10}")?;
        }
    }

    if !dexes.is_empty() {
        writeln!(out)?;
        writeln!(out, "swaps by dex:")?;
        for (dex, count) in &dexes {
            writeln!(out, "  {dex:<24} {count:>10}")?;
        }
    }

    if !emitters.is_empty() {
        writeln!(out)?;
        writeln!(out, "top log emitters:")?;
        for e in &emitters {
            let name = e.label.as_deref().unwrap_or("-");
            writeln!(out, "  {:<44} {:>8}  {}", e.address, e.count, name)?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_renders_placeholder() {
        let store = Store::open_in_memory().unwrap();
        let out = render(&store, 100).unwrap();
        assert!(out.contains("store is empty"));
    }
}
