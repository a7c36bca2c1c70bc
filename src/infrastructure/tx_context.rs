use crate::domain::ports::{ReadWriteSet, StateStore, WorldState};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

/// The host side of a single invocation.
///
/// Reads go to the committed store (or to this invocation's own pending writes)
/// and are recorded in the read-set; writes are buffered. Nothing reaches the
/// store until [`TxContext::commit`], so dropping the context aborts the invocation.
pub struct TxContext<'s> {
    store: &'s dyn StateStore,
    tx_id: String,
    timestamp: DateTime<Utc>,
    rw_set: ReadWriteSet,
}

impl<'s> TxContext<'s> {
    pub fn new(store: &'s dyn StateStore, tx_id: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            store,
            tx_id: tx_id.into(),
            timestamp,
            rw_set: ReadWriteSet::default(),
        }
    }

    pub fn rw_set(&self) -> &ReadWriteSet {
        &self.rw_set
    }

    /// Hands the read/write-set to the store for validation and atomic apply.
    pub async fn commit(self) -> Result<()> {
        if self.rw_set.is_read_only() {
            return Ok(());
        }
        debug!(
            tx_id = %self.tx_id,
            reads = self.rw_set.reads.len(),
            writes = self.rw_set.writes.len(),
            "committing transaction"
        );
        self.store.commit(self.rw_set).await
    }
}

#[async_trait]
impl WorldState for TxContext<'_> {
    async fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(pending) = self.rw_set.writes.get(key) {
            return Ok(Some(pending.clone()));
        }
        let value = self.store.get(key).await?;
        self.rw_set
            .reads
            .entry(key.to_string())
            .or_insert_with(|| value.clone());
        Ok(value)
    }

    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()> {
        self.rw_set.writes.insert(key.to_string(), value);
        Ok(())
    }

    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn tx_timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
