//! Host-side adapters: world-state backends and the per-invocation transaction context.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod tx_context;
