use crate::domain::ports::{ReadWriteSet, StateStore};
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory world state.
///
/// Uses `Arc<RwLock<BTreeMap<String, Vec<u8>>>>` so clones share the same state and
/// prefix scans come back in key order. Commits take the write lock for the whole
/// validate-then-apply step, which makes them atomic with respect to each other.
#[derive(Default, Clone)]
pub struct InMemoryStateStore {
    entries: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl InMemoryStateStore {
    /// Creates a new, empty in-memory world state.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for InMemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let entries = self.entries.read().await;
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect())
    }

    async fn commit(&self, rw_set: ReadWriteSet) -> Result<()> {
        let mut entries = self.entries.write().await;
        for (key, observed) in &rw_set.reads {
            if entries.get(key) != observed.as_ref() {
                return Err(LedgerError::Conflict(key.clone()));
            }
        }
        entries.extend(rw_set.writes);
        Ok(())
    }
}
