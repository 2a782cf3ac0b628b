use std::path::Path;

use redb::{Database, ReadableTable, TableDefinition};
use rkyv::{AlignedVec, Archive, Deserialize, Serialize};
use thiserror::Error;

/// One record per distinct URL key ever discovered. Never deleted; the
/// `completed` flag flips to true exactly once.
#[derive(Debug, Clone, PartialEq, Archive, Serialize, Deserialize)]
pub struct FrontierRecord {
    pub canonical_url: String,
    pub completed: bool,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Database error: {0}")]
    Redb(#[from] redb::Error),

    #[error("Database creation error: {0}")]
    RedbCreate(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),
}

const FRONTIER_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("frontier");

/// Durable key to `FrontierRecord` mapping backed by redb. Exclusively owned
/// by the frontier scheduler; a failure to open an existing store is fatal
/// at startup rather than silently re-seeding.
pub struct FrontierStore {
    db: Database,
}

impl FrontierStore {
    const DB_FILE: &'static str = "frontier.redb";

    /// Open (or create) the store under `data_dir`. With `restart` set, any
    /// existing database is discarded first and the crawl starts from seeds.
    pub fn open<P: AsRef<Path>>(data_dir: P, restart: bool) -> Result<Self, StoreError> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir)?;

        let db_path = data_dir.join(Self::DB_FILE);
        if restart && db_path.exists() {
            tracing::info!(path = %db_path.display(), "restart requested, discarding persisted frontier");
            std::fs::remove_file(&db_path)?;
        }

        let db = Database::create(&db_path)?;

        // Open the table once so the database creates it before first use.
        let write_txn = db.begin_write()?;
        {
            let _table = write_txn.open_table(FRONTIER_TABLE)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    pub fn contains(&self, key: u64) -> Result<bool, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FRONTIER_TABLE)?;
        Ok(table.get(key)?.is_some())
    }

    /// Durable point write: the transaction is committed before this returns,
    /// so a completed=true transition the process has acted on is never lost.
    pub fn upsert(&self, key: u64, record: &FrontierRecord) -> Result<(), StoreError> {
        let serialized = rkyv::to_bytes::<_, 256>(record)
            .map_err(|e| StoreError::Serialization(format!("Serialize failed: {}", e)))?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(FRONTIER_TABLE)?;
            table.insert(key, serialized.as_ref())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Full scan, used once at startup for restart replay.
    pub fn for_each<F>(&self, mut f: F) -> Result<(), StoreError>
    where
        F: FnMut(FrontierRecord),
    {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FRONTIER_TABLE)?;

        for result in table.iter()? {
            let (_key, value) = result?;
            let mut aligned = AlignedVec::new();
            aligned.extend_from_slice(value.value());
            let record: FrontierRecord = unsafe { rkyv::from_bytes_unchecked(&aligned) }
                .map_err(|e| StoreError::Serialization(format!("Deserialize failed: {}", e)))?;
            f(record);
        }

        Ok(())
    }

    /// (total, completed) record counts. Linear scan, acceptable at this scale.
    pub fn counts(&self) -> Result<(usize, usize), StoreError> {
        let mut total = 0;
        let mut completed = 0;
        self.for_each(|record| {
            total += 1;
            if record.completed {
                completed += 1;
            }
        })?;
        Ok((total, completed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_utils::url_key;
    use tempfile::TempDir;

    fn record(url: &str, completed: bool) -> FrontierRecord {
        FrontierRecord {
            canonical_url: url.to_string(),
            completed,
        }
    }

    #[test]
    fn test_upsert_and_contains() {
        let dir = TempDir::new().unwrap();
        let store = FrontierStore::open(dir.path(), false).unwrap();

        let key = url_key("https://test.local/");
        assert!(!store.contains(key).unwrap());

        store.upsert(key, &record("https://test.local/", false)).unwrap();
        assert!(store.contains(key).unwrap());
    }

    #[test]
    fn test_upsert_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = FrontierStore::open(dir.path(), false).unwrap();

        let key = url_key("https://test.local/");
        store.upsert(key, &record("https://test.local/", false)).unwrap();
        store.upsert(key, &record("https://test.local/", true)).unwrap();

        let mut records = Vec::new();
        store.for_each(|r| records.push(r)).unwrap();
        assert_eq!(records, vec![record("https://test.local/", true)]);
    }

    #[test]
    fn test_records_survive_reopen() {
        let dir = TempDir::new().unwrap();

        {
            let store = FrontierStore::open(dir.path(), false).unwrap();
            store
                .upsert(url_key("https://test.local/a"), &record("https://test.local/a", false))
                .unwrap();
            store
                .upsert(url_key("https://test.local/b"), &record("https://test.local/b", true))
                .unwrap();
        }

        let store = FrontierStore::open(dir.path(), false).unwrap();
        assert_eq!(store.counts().unwrap(), (2, 1));
    }

    #[test]
    fn test_unusable_data_dir_fails_loudly() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();

        // Startup must not silently proceed past an unusable store location.
        assert!(FrontierStore::open(&blocker, false).is_err());
    }

    #[test]
    fn test_restart_discards_records() {
        let dir = TempDir::new().unwrap();

        {
            let store = FrontierStore::open(dir.path(), false).unwrap();
            store
                .upsert(url_key("https://test.local/a"), &record("https://test.local/a", false))
                .unwrap();
        }

        let store = FrontierStore::open(dir.path(), true).unwrap();
        assert_eq!(store.counts().unwrap(), (0, 0));
    }
}
