//! Ledger records, their invariants, and the ports through which they are stored.

pub mod loan;
pub mod ports;
pub mod record;
pub mod token;
