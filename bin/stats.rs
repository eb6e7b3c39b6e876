use anyhow::Context;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use basewatch::{stats, Settings, Store};

fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .init()
        .unwrap();

    let settings = Settings::new()
        .context("Failed to load configuration from the environment (is RPC_URL set?)")?;

    let store = Store::open(&settings.db_path)?;
    let report = stats::render(&store, settings.stats_window_blocks)?;
    print!("{report}");

    Ok(())
}
