use crate::domain::ports::{ReadWriteSet, StateStore};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family holding the ledger's world state.
pub const CF_WORLD_STATE: &str = "world_state";

impl From<rocksdb::Error> for LedgerError {
    fn from(e: rocksdb::Error) -> Self {
        LedgerError::Storage(e.to_string())
    }
}

/// A persistent world state backed by RocksDB.
///
/// Commits are validated and applied under a single mutex and written with one
/// `WriteBatch`, so an invocation's writes land together or not at all.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDbStateStore {
    db: Arc<DB>,
    commit_lock: Arc<Mutex<()>>,
}

impl RocksDbStateStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the world state column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_state = ColumnFamilyDescriptor::new(CF_WORLD_STATE, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_state])?;

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(CF_WORLD_STATE)
            .ok_or_else(|| LedgerError::Storage("world state column family not found".into()))
    }
}

#[async_trait]
impl StateStore for RocksDbStateStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.cf()?;
        Ok(self.db.get_cf(cf, key.as_bytes())?)
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let cf = self.cf()?;
        let mut entries = Vec::new();
        let iter = self
            .db
            .iterator_cf(cf, IteratorMode::From(prefix.as_bytes(), Direction::Forward));

        for item in iter {
            let (key, value) = item?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            let key = String::from_utf8(key.to_vec())
                .map_err(|e| LedgerError::Storage(format!("non UTF-8 key in world state: {e}")))?;
            entries.push((key, value.to_vec()));
        }

        Ok(entries)
    }

    async fn commit(&self, rw_set: ReadWriteSet) -> Result<()> {
        let _guard = self.commit_lock.lock().await;
        let cf = self.cf()?;

        for (key, observed) in &rw_set.reads {
            let current = self.db.get_cf(cf, key.as_bytes())?;
            if current != *observed {
                return Err(LedgerError::Conflict(key.clone()));
            }
        }

        let mut batch = WriteBatch::default();
        for (key, value) in &rw_set.writes {
            batch.put_cf(cf, key.as_bytes(), value);
        }
        self.db.write(batch)?;

        Ok(())
    }
}
