use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A strictly positive quantity of tokens moved by a transfer or repayment.
///
/// Construction is the only place the sign is checked, so holding an `Amount`
/// means the value has already been validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount(format!(
                "amount must be positive, got {value}"
            )))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        let value = Decimal::from_str(s)
            .map_err(|e| LedgerError::InvalidArgument(format!("'{s}' is not a decimal: {e}")))?;
        Self::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Token holdings of one account, as stored in the world state.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct TokenBalance {
    pub account: String,
    pub balance: Decimal,
}

impl TokenBalance {
    pub fn new(account: impl Into<String>, balance: Decimal) -> Self {
        Self {
            account: account.into(),
            balance,
        }
    }

    /// An account seen for the first time on the credit side of a transfer.
    pub fn empty(account: impl Into<String>) -> Self {
        Self::new(account, Decimal::ZERO)
    }

    pub fn covers(&self, amount: Decimal) -> bool {
        self.balance >= amount
    }

    /// Removes `amount`, refusing to go below zero.
    pub fn debit(&mut self, amount: Amount) -> Result<()> {
        if !self.covers(amount.value()) {
            return Err(LedgerError::InsufficientFunds(self.account.clone()));
        }
        self.balance -= amount.value();
        Ok(())
    }

    pub fn credit(&mut self, amount: Amount) -> Result<()> {
        self.balance = self.balance.checked_add(amount.value()).ok_or_else(|| {
            LedgerError::InvalidAmount(format!("credit overflows balance of {}", self.account))
        })?;
        Ok(())
    }
}
