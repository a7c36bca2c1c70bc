use crate::domain::loan::LoanStatus;
use thiserror::Error;

/// Every way an invocation against the ledger can fail.
///
/// A failed invocation never commits: the error is surfaced to the caller and the
/// world state is left exactly as it was.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("{0} does not exist")]
    NotFound(String),
    #[error("{0} already exists")]
    AlreadyExists(String),
    #[error("loan {loan_id} cannot be {action} in current status: {status}")]
    InvalidStateTransition {
        loan_id: String,
        action: &'static str,
        status: LoanStatus,
    },
    #[error("insufficient funds in account {0}")]
    InsufficientFunds(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("read conflict on key {0}: value changed since it was read")]
    Conflict(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Stable name of the error kind, as reported to invoking clients.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::AlreadyExists(_) => "AlreadyExists",
            Self::InvalidStateTransition { .. } => "InvalidStateTransition",
            Self::InsufficientFunds(_) => "InsufficientFunds",
            Self::InvalidAmount(_) => "InvalidAmount",
            Self::InvalidArgument(_) => "InvalidArgument",
            Self::Serialization(_) => "SerializationError",
            Self::Storage(_) | Self::Io(_) => "StorageError",
            Self::Conflict(_) => "Conflict",
            Self::Config(_) => "ConfigError",
            Self::Csv(_) => "InputError",
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
