use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use log::info;
use rusqlite::Connection;

pub mod models;
mod ops;
mod schema;

pub use ops::{parse_top_contracts, EmitterRow, WindowTotals};

/// Embedded SQLite store.
///
/// Single writer: every operation takes the connection mutex for the
/// duration of its transaction. Readers (the stats binary) open their own
/// connection against the same WAL-mode file.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (creating if needed) the store at `path` and run migrations.
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open store at {}", path.display()))?;
        let store = Self::from_connection(conn)?;

        info!("Store ready at {}", path.display());
        Ok(store)
    }

    /// In-memory store, used by tests.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.execute_batch(schema::SCHEMA)
            .context("Failed to migrate store schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}
