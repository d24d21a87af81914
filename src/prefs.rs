//! Persisted app preferences.
//!
//! A single redb table of JSON-serialized records. Today this holds one
//! scalar: the last time the sync listener heard from the watch.

use anyhow::{Context, Result};
use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const PREFS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("prefs");
const LAST_CONNECTION_KEY: &str = "last_connection_time";

/// Serialized form stored as JSON bytes in redb.
#[derive(Serialize, Deserialize)]
struct StoredTimestamp {
    epoch_ms: i64,
}

pub struct PrefsDb {
    db: Database,
}

impl PrefsDb {
    pub fn new() -> Result<Self> {
        let db_path = Self::get_db_path()?;
        Self::open(db_path)
    }

    fn open(path: PathBuf) -> Result<Self> {
        let db = Database::create(&path).context("Failed to open prefs database")?;
        // Ensure table exists
        let txn = db.begin_write()?;
        { let _ = txn.open_table(PREFS_TABLE)?; }
        txn.commit()?;
        Ok(Self { db })
    }

    fn get_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .context("Failed to get data directory")?
            .join("bowlsync");
        std::fs::create_dir_all(&data_dir)
            .context("Failed to create data directory")?;
        Ok(data_dir.join("prefs.redb"))
    }

    /// Record the time of the latest contact from the watch.
    pub fn set_last_connection_time(&self, epoch_ms: i64) -> Result<()> {
        let json = serde_json::to_vec(&StoredTimestamp { epoch_ms })?;
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(PREFS_TABLE)?;
            table.insert(LAST_CONNECTION_KEY, json.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }

    /// Last contact time, or None if the watch has never connected.
    pub fn last_connection_time(&self) -> Result<Option<i64>> {
        let rtxn = self.db.begin_read()?;
        let table = rtxn.open_table(PREFS_TABLE)?;
        let Some(val) = table.get(LAST_CONNECTION_KEY)? else {
            return Ok(None);
        };
        let stored: StoredTimestamp = serde_json::from_slice(val.value())?;
        if stored.epoch_ms > 0 {
            Ok(Some(stored.epoch_ms))
        } else {
            Ok(None)
        }
    }

    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let path = std::env::temp_dir().join(format!(
            "bowlsync-prefs-test-{}-{}.redb",
            std::process::id(),
            n
        ));
        Self::open(path)
    }
}
