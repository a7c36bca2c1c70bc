use crate::domain::token::TokenBalance;
use crate::error::Result;
use std::io::Write;

/// Writes account balances as CSV (`account,balance`).
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_balances(&mut self, balances: impl IntoIterator<Item = TokenBalance>) -> Result<()> {
        for balance in balances {
            self.writer.serialize(balance)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
