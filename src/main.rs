use chrono::{DateTime, Utc};
use clap::Parser;
use lendchain::config::GenesisConfig;
use lendchain::domain::ports::StateStoreBox;
use lendchain::infrastructure::in_memory::InMemoryStateStore;
use lendchain::interfaces::contract::{HostClock, LendingContract};
use lendchain::interfaces::csv::balance_writer::BalanceWriter;
use lendchain::interfaces::csv::invocation_reader::InvocationReader;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Invocations CSV file, one `Function, arg, ...` per row
    input: PathBuf,

    /// Path to persistent world state (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Genesis TOML listing the accounts seeded by InitLedger
    #[arg(long)]
    genesis: Option<PathBuf>,

    /// Pin every transaction timestamp (RFC 3339) for reproducible runs
    #[arg(long)]
    clock: Option<DateTime<Utc>>,
}

fn open_store(db_path: Option<PathBuf>) -> Result<StateStoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = lendchain::infrastructure::rocksdb::RocksDbStateStore::open(path)
                .into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            tracing::warn!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryStateStore::new()))
        }
        None => Ok(Box::new(InMemoryStateStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();

    let cli = Cli::parse();

    let genesis = match cli.genesis {
        Some(path) => GenesisConfig::load(path).into_diagnostic()?,
        None => GenesisConfig::default(),
    };
    let clock = cli.clock.map(HostClock::Fixed).unwrap_or_default();
    let contract = LendingContract::new(open_store(cli.db_path)?, genesis).with_clock(clock);

    let stdout = io::stdout();
    let file = File::open(cli.input).into_diagnostic()?;
    let reader = InvocationReader::new(file);
    for invocation in reader.invocations() {
        match invocation {
            Ok(invocation) => {
                let is_query = invocation.is_query();
                match contract.submit(invocation).await {
                    Ok(receipt) if is_query => {
                        let line = serde_json::to_string(&receipt).into_diagnostic()?;
                        writeln!(stdout.lock(), "{line}").into_diagnostic()?;
                    }
                    Ok(_) => {}
                    Err(e) => error!("Error processing invocation: [{}] {}", e.kind(), e),
                }
            }
            Err(e) => error!("Error reading invocation: {}", e),
        }
    }

    // Final state of every account
    let balances = contract.balances().await.into_diagnostic()?;
    let mut writer = BalanceWriter::new(stdout.lock());
    writer.write_balances(balances).into_diagnostic()?;

    Ok(())
}
