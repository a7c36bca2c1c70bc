use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// The world state as seen from inside one invocation.
///
/// Everything the ledger core knows about storage and the host transaction goes
/// through this trait. Writes are only visible to other invocations once the host
/// commits the whole invocation.
#[async_trait]
pub trait WorldState: Send {
    async fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>>;
    fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<()>;
    fn tx_id(&self) -> &str;
    fn tx_timestamp(&self) -> DateTime<Utc>;
}

/// Keys read by an invocation (with the value observed) and the values it wants
/// to write. Committed as a single unit.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReadWriteSet {
    pub reads: BTreeMap<String, Option<Vec<u8>>>,
    pub writes: BTreeMap<String, Vec<u8>>,
}

impl ReadWriteSet {
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }
}

/// Committed world state backing the host.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    /// All entries whose key starts with `prefix`, in key order.
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>>;
    /// Applies every write atomically, or nothing if any read is stale.
    async fn commit(&self, rw_set: ReadWriteSet) -> Result<()>;
}

pub type StateStoreBox = Box<dyn StateStore>;
