//! Entry points into the ledger: the contract façade and its CSV adapters.

pub mod contract;
pub mod csv;
