//! World-state keys and the canonical byte encoding of ledger records.

use super::loan::Loan;
use super::ports::WorldState;
use super::token::TokenBalance;
use crate::error::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub const LOAN_PREFIX: &str = "loan~";
pub const BALANCE_PREFIX: &str = "balance~";

/// A record stored under a single world-state key as JSON.
pub trait StateRecord: Serialize + DeserializeOwned {
    const PREFIX: &'static str;

    fn id(&self) -> &str;

    fn key_for(id: &str) -> String {
        format!("{}{id}", Self::PREFIX)
    }

    fn key(&self) -> String {
        Self::key_for(self.id())
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

impl StateRecord for Loan {
    const PREFIX: &'static str = LOAN_PREFIX;

    fn id(&self) -> &str {
        &self.loan_id
    }
}

impl StateRecord for TokenBalance {
    const PREFIX: &'static str = BALANCE_PREFIX;

    fn id(&self) -> &str {
        &self.account
    }
}

/// Reads and decodes the record stored under `id`, if any.
pub async fn load<R: StateRecord>(state: &mut dyn WorldState, id: &str) -> Result<Option<R>> {
    match state.get_state(&R::key_for(id)).await? {
        Some(bytes) => Ok(Some(R::from_bytes(&bytes)?)),
        None => Ok(None),
    }
}

/// Encodes the full record and writes it back under its key.
pub fn save<R: StateRecord>(state: &mut dyn WorldState, record: &R) -> Result<()> {
    state.put_state(&record.key(), record.to_bytes()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use rust_decimal_macros::dec;

    #[test]
    fn test_keys_are_namespaced() {
        assert_eq!(Loan::key_for("L1"), "loan~L1");
        assert_eq!(TokenBalance::key_for("L1"), "balance~L1");
        assert_eq!(TokenBalance::new("RBI", dec!(1)).key(), "balance~RBI");
    }

    #[test]
    fn test_balance_round_trip() {
        let balance = TokenBalance::new("HDFC", dec!(499000.25));
        let decoded = TokenBalance::from_bytes(&balance.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, balance);
    }

    #[test]
    fn test_corrupt_bytes_are_serialization_errors() {
        let result = Loan::from_bytes(b"{\"loanId\": 5}");
        assert!(matches!(result, Err(LedgerError::Serialization(_))));
    }
}
