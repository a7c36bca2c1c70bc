#![allow(dead_code)]

use lendchain::config::GenesisConfig;
use lendchain::domain::token::TokenBalance;
use lendchain::infrastructure::in_memory::InMemoryStateStore;
use lendchain::interfaces::contract::{HostClock, LendingContract};
use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::{Error, Write};
use tempfile::NamedTempFile;

/// Writes invocation rows to a temporary CSV file.
pub fn invocations_file(rows: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    for row in rows {
        writeln!(file, "{row}")?;
    }
    file.flush()?;
    Ok(file)
}

/// The two-bank genesis used throughout the scenarios.
pub fn two_banks() -> GenesisConfig {
    GenesisConfig {
        accounts: vec![
            TokenBalance::new("RBI", dec!(1000000)),
            TokenBalance::new("HDFC", dec!(500000)),
        ],
    }
}

pub fn contract(genesis: GenesisConfig) -> LendingContract {
    let at = "2024-01-15T10:00:00Z".parse().expect("valid timestamp");
    LendingContract::new(Box::new(InMemoryStateStore::new()), genesis)
        .with_clock(HostClock::Fixed(at))
}

pub fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Splits `total` into random positive installments with two decimal places.
pub fn random_installments(total: Decimal, max_parts: usize) -> Vec<Decimal> {
    let mut rng = rand::thread_rng();
    let mut remaining = total;
    let mut parts = Vec::new();
    while remaining > Decimal::ZERO && parts.len() + 1 < max_parts {
        let cents = (remaining * dec!(100)).trunc();
        let cents = u64::try_from(cents).expect("installment fits in u64");
        if cents <= 1 {
            break;
        }
        let part = Decimal::new(rng.gen_range(1..cents) as i64, 2);
        parts.push(part);
        remaining -= part;
    }
    if remaining > Decimal::ZERO {
        parts.push(remaining);
    }
    parts
}
