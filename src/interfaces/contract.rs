//! The contract façade: named operations in, typed responses out.
//!
//! [`LendingContract`] also plays the host's part for each invocation. It assigns
//! the transaction id and timestamp, runs the operation against a [`TxContext`],
//! and commits the buffered writes only if the operation succeeded.

use crate::application::loans::LoanEngine;
use crate::application::tokens::TokenLedger;
use crate::config::GenesisConfig;
use crate::domain::loan::{Loan, LoanStatus, LoanTerms};
use crate::domain::ports::{StateStoreBox, WorldState};
use crate::domain::record::{BALANCE_PREFIX, StateRecord};
use crate::domain::token::{Amount, TokenBalance};
use crate::error::{LedgerError, Result};
use crate::infrastructure::tx_context::TxContext;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use tracing::{info, warn};
use uuid::Uuid;

/// One call against the contract, with its arguments already parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum Invocation {
    InitLedger,
    RequestLoan(LoanTerms),
    ApproveLoan { loan_id: String, lender_id: String },
    DisburseLoan { loan_id: String },
    RepayLoan { loan_id: String, amount: Amount },
    MarkAsDefaulted { loan_id: String },
    AddCollateral { loan_id: String, collateral: String },
    GetLoan { loan_id: String },
    GetLoanHistory { loan_id: String },
    CheckLoanStatus { loan_id: String },
    GetBalance { account: String },
    TransferTokens { from: String, to: String, amount: Amount },
    LoanExists { loan_id: String },
}

impl Invocation {
    /// Parses a function name and its positional string arguments.
    pub fn parse(function: &str, args: &[String]) -> Result<Self> {
        let args = Args { function, args };
        let invocation = match function {
            "InitLedger" => {
                args.arity(0)?;
                Self::InitLedger
            }
            "RequestLoan" => {
                args.arity(6)?;
                Self::RequestLoan(LoanTerms {
                    loan_id: args.string(0),
                    borrower_id: args.string(1),
                    amount: args.amount(2)?,
                    interest_rate: args.decimal(3)?,
                    duration: args.months(4)?,
                    collateral: args.string(5),
                })
            }
            "ApproveLoan" => {
                args.arity(2)?;
                Self::ApproveLoan {
                    loan_id: args.string(0),
                    lender_id: args.string(1),
                }
            }
            "DisburseLoan" => Self::DisburseLoan {
                loan_id: args.single()?,
            },
            "RepayLoan" => {
                args.arity(2)?;
                Self::RepayLoan {
                    loan_id: args.string(0),
                    amount: args.amount(1)?,
                }
            }
            "MarkAsDefaulted" => Self::MarkAsDefaulted {
                loan_id: args.single()?,
            },
            "AddCollateral" => {
                args.arity(2)?;
                Self::AddCollateral {
                    loan_id: args.string(0),
                    collateral: args.string(1),
                }
            }
            "GetLoan" => Self::GetLoan {
                loan_id: args.single()?,
            },
            "GetLoanHistory" => Self::GetLoanHistory {
                loan_id: args.single()?,
            },
            "CheckLoanStatus" => Self::CheckLoanStatus {
                loan_id: args.single()?,
            },
            "GetBalance" => Self::GetBalance {
                account: args.single()?,
            },
            "TransferTokens" => {
                args.arity(3)?;
                Self::TransferTokens {
                    from: args.string(0),
                    to: args.string(1),
                    amount: args.amount(2)?,
                }
            }
            "LoanExists" => Self::LoanExists {
                loan_id: args.single()?,
            },
            other => {
                return Err(LedgerError::InvalidArgument(format!(
                    "unknown function {other}"
                )));
            }
        };
        Ok(invocation)
    }

    pub fn function(&self) -> &'static str {
        match self {
            Self::InitLedger => "InitLedger",
            Self::RequestLoan(_) => "RequestLoan",
            Self::ApproveLoan { .. } => "ApproveLoan",
            Self::DisburseLoan { .. } => "DisburseLoan",
            Self::RepayLoan { .. } => "RepayLoan",
            Self::MarkAsDefaulted { .. } => "MarkAsDefaulted",
            Self::AddCollateral { .. } => "AddCollateral",
            Self::GetLoan { .. } => "GetLoan",
            Self::GetLoanHistory { .. } => "GetLoanHistory",
            Self::CheckLoanStatus { .. } => "CheckLoanStatus",
            Self::GetBalance { .. } => "GetBalance",
            Self::TransferTokens { .. } => "TransferTokens",
            Self::LoanExists { .. } => "LoanExists",
        }
    }

    /// Queries never write to the world state.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Self::GetLoan { .. }
                | Self::GetLoanHistory { .. }
                | Self::CheckLoanStatus { .. }
                | Self::GetBalance { .. }
                | Self::LoanExists { .. }
        )
    }
}

struct Args<'a> {
    function: &'a str,
    args: &'a [String],
}

impl Args<'_> {
    fn arity(&self, expected: usize) -> Result<()> {
        if self.args.len() == expected {
            Ok(())
        } else {
            Err(LedgerError::InvalidArgument(format!(
                "{} expects {expected} argument(s), got {}",
                self.function,
                self.args.len()
            )))
        }
    }

    fn single(&self) -> Result<String> {
        self.arity(1)?;
        Ok(self.string(0))
    }

    fn string(&self, index: usize) -> String {
        self.args[index].clone()
    }

    fn amount(&self, index: usize) -> Result<Amount> {
        Amount::from_str(&self.args[index])
    }

    fn decimal(&self, index: usize) -> Result<Decimal> {
        let raw = &self.args[index];
        Decimal::from_str(raw)
            .map_err(|e| LedgerError::InvalidArgument(format!("'{raw}' is not a decimal: {e}")))
    }

    fn months(&self, index: usize) -> Result<u32> {
        let raw = &self.args[index];
        raw.parse().map_err(|e| {
            LedgerError::InvalidArgument(format!("'{raw}' is not a whole number of months: {e}"))
        })
    }
}

/// What an invocation hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Committed,
    Loan(Box<Loan>),
    History(Vec<String>),
    Status(LoanStatus),
    Balance(Decimal),
    Exists(bool),
}

/// A successful invocation, tagged with the transaction it ran in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub tx_id: String,
    pub function: &'static str,
    pub result: Response,
}

/// Source of transaction timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum HostClock {
    #[default]
    System,
    /// Every invocation sees the same instant; used for reproducible replays.
    Fixed(DateTime<Utc>),
}

impl HostClock {
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            HostClock::System => Utc::now(),
            HostClock::Fixed(at) => *at,
        }
    }
}

/// The lending contract as exposed to invokers.
pub struct LendingContract {
    store: StateStoreBox,
    genesis: GenesisConfig,
    clock: HostClock,
}

impl LendingContract {
    pub fn new(store: StateStoreBox, genesis: GenesisConfig) -> Self {
        Self {
            store,
            genesis,
            clock: HostClock::default(),
        }
    }

    pub fn with_clock(mut self, clock: HostClock) -> Self {
        self.clock = clock;
        self
    }

    /// Parses and submits a string-form invocation.
    pub async fn invoke(&self, function: &str, args: &[String]) -> Result<Receipt> {
        self.submit(Invocation::parse(function, args)?).await
    }

    /// Runs one invocation as a single all-or-nothing transaction.
    pub async fn submit(&self, invocation: Invocation) -> Result<Receipt> {
        let tx_id = Uuid::now_v7().to_string();
        let function = invocation.function();
        let mut ctx = TxContext::new(self.store.as_ref(), tx_id.clone(), self.clock.now());

        let outcome = match self.execute(&mut ctx, invocation).await {
            Ok(response) => ctx.commit().await.map(|()| response),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(result) => {
                info!(tx_id = %tx_id, function, "invocation committed");
                Ok(Receipt {
                    tx_id,
                    function,
                    result,
                })
            }
            Err(e) => {
                warn!(tx_id = %tx_id, function, kind = e.kind(), error = %e, "invocation rejected");
                Err(e)
            }
        }
    }

    /// Current balances of every account, ordered by account name.
    pub async fn balances(&self) -> Result<Vec<TokenBalance>> {
        self.store
            .scan_prefix(BALANCE_PREFIX)
            .await?
            .into_iter()
            .map(|(_, bytes)| TokenBalance::from_bytes(&bytes))
            .collect()
    }

    async fn execute(&self, state: &mut dyn WorldState, invocation: Invocation) -> Result<Response> {
        match invocation {
            Invocation::InitLedger => TokenLedger::new(state)
                .seed(&self.genesis.accounts)
                .await
                .map(committed),
            Invocation::RequestLoan(terms) => LoanEngine::new(state)
                .request_loan(terms)
                .await
                .map(committed),
            Invocation::ApproveLoan { loan_id, lender_id } => LoanEngine::new(state)
                .approve_loan(&loan_id, &lender_id)
                .await
                .map(committed),
            Invocation::DisburseLoan { loan_id } => LoanEngine::new(state)
                .disburse_loan(&loan_id)
                .await
                .map(committed),
            Invocation::RepayLoan { loan_id, amount } => LoanEngine::new(state)
                .repay_loan(&loan_id, amount)
                .await
                .map(committed),
            Invocation::MarkAsDefaulted { loan_id } => LoanEngine::new(state)
                .mark_as_defaulted(&loan_id)
                .await
                .map(committed),
            Invocation::AddCollateral {
                loan_id,
                collateral,
            } => LoanEngine::new(state)
                .add_collateral(&loan_id, &collateral)
                .await
                .map(committed),
            Invocation::GetLoan { loan_id } => LoanEngine::new(state)
                .get_loan(&loan_id)
                .await
                .map(|loan| Response::Loan(Box::new(loan))),
            Invocation::GetLoanHistory { loan_id } => LoanEngine::new(state)
                .loan_history(&loan_id)
                .await
                .map(Response::History),
            Invocation::CheckLoanStatus { loan_id } => LoanEngine::new(state)
                .loan_status(&loan_id)
                .await
                .map(Response::Status),
            Invocation::GetBalance { account } => TokenLedger::new(state)
                .balance(&account)
                .await
                .map(Response::Balance),
            Invocation::TransferTokens { from, to, amount } => TokenLedger::new(state)
                .transfer(&from, &to, amount)
                .await
                .map(committed),
            Invocation::LoanExists { loan_id } => LoanEngine::new(state)
                .exists(&loan_id)
                .await
                .map(Response::Exists),
        }
    }
}

fn committed<T>(_: T) -> Response {
    Response::Committed
}
