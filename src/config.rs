use crate::domain::token::TokenBalance;
use crate::error::{LedgerError, Result};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Accounts and starting balances written by `InitLedger`.
///
/// ```toml
/// [[accounts]]
/// account = "RBI"
/// balance = "1000000"
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GenesisConfig {
    pub accounts: Vec<TokenBalance>,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            accounts: vec![
                TokenBalance::new("RBI", dec!(1000000)),
                TokenBalance::new("HDFC", dec!(500000)),
                TokenBalance::new("SBI", dec!(500000)),
            ],
        }
    }
}

impl GenesisConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| LedgerError::Config(e.message().to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.accounts.is_empty() {
            return Err(LedgerError::Config(
                "genesis must seed at least one account".into(),
            ));
        }
        let mut seen = HashSet::new();
        for entry in &self.accounts {
            if entry.account.trim().is_empty() {
                return Err(LedgerError::Config("genesis account name is empty".into()));
            }
            if !seen.insert(entry.account.as_str()) {
                return Err(LedgerError::Config(format!(
                    "genesis account {} listed twice",
                    entry.account
                )));
            }
            if entry.balance.is_sign_negative() {
                return Err(LedgerError::Config(format!(
                    "genesis balance for {} is negative",
                    entry.account
                )));
            }
        }
        Ok(())
    }
}
