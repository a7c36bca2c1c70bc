//! Application layer containing the ledger's business logic.
//!
//! [`loans::LoanEngine`] runs the loan lifecycle and [`tokens::TokenLedger`] moves
//! funds between accounts. Both operate on the `WorldState` of a single invocation
//! and leave committing to the host.

pub mod loans;
pub mod tokens;
