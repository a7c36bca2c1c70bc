use super::token::Amount;
use crate::error::{LedgerError, Result};
use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle position of a loan.
///
/// ```text
/// PENDING -> APPROVED -> ACTIVE -> REPAID
///                               \-> DEFAULTED
/// ```
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    Pending,
    Approved,
    Active,
    Repaid,
    Defaulted,
}

impl LoanStatus {
    /// The transition table. Anything not listed here is rejected.
    pub fn can_transition_to(self, next: LoanStatus) -> bool {
        use LoanStatus::*;
        matches!(
            (self, next),
            (Pending, Approved) | (Approved, Active) | (Active, Repaid) | (Active, Defaulted)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, LoanStatus::Repaid | LoanStatus::Defaulted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LoanStatus::Pending => "PENDING",
            LoanStatus::Approved => "APPROVED",
            LoanStatus::Active => "ACTIVE",
            LoanStatus::Repaid => "REPAID",
            LoanStatus::Defaulted => "DEFAULTED",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terms supplied by a borrower when requesting a loan.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanTerms {
    pub loan_id: String,
    pub borrower_id: String,
    pub amount: Amount,
    /// Percentage, e.g. `10` for 10%.
    pub interest_rate: Decimal,
    /// Whole months until the loan falls due.
    pub duration: u32,
    pub collateral: String,
}

/// A loan record as persisted in the world state.
///
/// Field names are part of the on-ledger schema shared by every replica.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub loan_id: String,
    pub borrower_id: String,
    /// Empty until the loan is approved.
    #[serde(default)]
    pub lender_id: String,
    pub amount: Decimal,
    pub interest_rate: Decimal,
    pub duration: u32,
    pub status: LoanStatus,
    #[serde(default)]
    pub disbursement_date: Option<DateTime<Utc>>,
    pub repayment_due: Decimal,
    pub remaining_balance: Decimal,
    #[serde(default)]
    pub collateral: String,
    #[serde(default)]
    pub defaulted: bool,
    #[serde(default)]
    pub audit_history: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
}

impl Loan {
    /// Builds a fresh `PENDING` loan from the borrower's terms.
    ///
    /// `repaymentDue` is fixed here as `amount * (1 + interestRate / 100)` and the
    /// due date is `now + duration` calendar months.
    pub fn request(terms: LoanTerms, now: DateTime<Utc>, tx_id: &str) -> Result<Self> {
        if terms.loan_id.trim().is_empty() {
            return Err(LedgerError::InvalidArgument("loan id must not be empty".into()));
        }
        if terms.borrower_id.trim().is_empty() {
            return Err(LedgerError::InvalidArgument(
                "borrower id must not be empty".into(),
            ));
        }
        if terms.interest_rate.is_sign_negative() {
            return Err(LedgerError::InvalidArgument(format!(
                "interest rate must not be negative, got {}",
                terms.interest_rate
            )));
        }
        if terms.duration == 0 {
            return Err(LedgerError::InvalidArgument(
                "duration must be at least one month".into(),
            ));
        }

        let amount = terms.amount.value();
        let repayment_due = (terms.interest_rate / Decimal::ONE_HUNDRED)
            .checked_add(Decimal::ONE)
            .and_then(|factor| amount.checked_mul(factor))
            .ok_or_else(|| {
                LedgerError::InvalidAmount(format!("repayment due for {amount} overflows"))
            })?;
        let due_date = now
            .checked_add_months(Months::new(terms.duration))
            .ok_or_else(|| {
                LedgerError::InvalidArgument(format!(
                    "due date {} months after {now} is out of range",
                    terms.duration
                ))
            })?;

        let audit = format!(
            "Loan requested by {} (TxID: {tx_id})",
            terms.borrower_id
        );

        Ok(Self {
            loan_id: terms.loan_id,
            borrower_id: terms.borrower_id,
            lender_id: String::new(),
            amount,
            interest_rate: terms.interest_rate,
            duration: terms.duration,
            status: LoanStatus::Pending,
            disbursement_date: None,
            repayment_due,
            remaining_balance: repayment_due,
            collateral: terms.collateral,
            defaulted: false,
            audit_history: vec![audit],
            created_at: now,
            due_date,
        })
    }

    /// Fails unless the loan is currently in `expected`.
    pub fn require_status(&self, expected: LoanStatus, action: &'static str) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(self.rejected(action))
        }
    }

    /// Checks a repayment against the current state without applying it.
    pub fn validate_repayment(&self, amount: Amount) -> Result<()> {
        self.require_status(LoanStatus::Active, "repaid")?;
        if amount.value() > self.remaining_balance {
            return Err(LedgerError::InvalidAmount(format!(
                "repayment of {amount} exceeds remaining balance {} on loan {}",
                self.remaining_balance, self.loan_id
            )));
        }
        Ok(())
    }

    pub fn approve(&mut self, lender_id: &str, tx_id: &str) -> Result<()> {
        self.transition_to(LoanStatus::Approved, "approved")?;
        self.lender_id = lender_id.to_string();
        self.audit(format!("Loan approved by {lender_id} (TxID: {tx_id})"));
        Ok(())
    }

    pub fn disburse(&mut self, at: DateTime<Utc>, tx_id: &str) -> Result<()> {
        self.transition_to(LoanStatus::Active, "disbursed")?;
        self.disbursement_date = Some(at);
        self.audit(format!(
            "Loan disbursed by {} to {} (TxID: {tx_id})",
            self.lender_id, self.borrower_id
        ));
        Ok(())
    }

    /// Applies a repayment that has already moved funds; settles the loan once
    /// nothing remains.
    pub fn repay(&mut self, amount: Amount, tx_id: &str) -> Result<()> {
        self.validate_repayment(amount)?;
        self.remaining_balance -= amount.value();
        if self.remaining_balance <= Decimal::ZERO {
            self.remaining_balance = Decimal::ZERO;
            self.transition_to(LoanStatus::Repaid, "repaid")?;
        }
        self.audit(format!(
            "Repayment of {amount} by {} (TxID: {tx_id})",
            self.borrower_id
        ));
        Ok(())
    }

    pub fn mark_defaulted(&mut self, tx_id: &str) -> Result<()> {
        self.transition_to(LoanStatus::Defaulted, "defaulted")?;
        self.defaulted = true;
        self.audit(format!("Loan marked as defaulted (TxID: {tx_id})"));
        Ok(())
    }

    /// Replaces the collateral description. Allowed in every status.
    pub fn set_collateral(&mut self, collateral: &str, tx_id: &str) {
        self.collateral = collateral.to_string();
        self.audit(format!(
            "Collateral added by {}: {collateral} (TxID: {tx_id})",
            self.borrower_id
        ));
    }

    /// `0 <= remainingBalance <= repaymentDue`, and `defaulted` mirrors the status.
    pub fn check_invariants(&self) -> Result<()> {
        if self.remaining_balance.is_sign_negative() || self.remaining_balance > self.repayment_due
        {
            return Err(LedgerError::InvalidAmount(format!(
                "loan {} remaining balance {} outside [0, {}]",
                self.loan_id, self.remaining_balance, self.repayment_due
            )));
        }
        if self.defaulted != (self.status == LoanStatus::Defaulted) {
            return Err(LedgerError::InvalidArgument(format!(
                "loan {} defaulted flag disagrees with status {}",
                self.loan_id, self.status
            )));
        }
        Ok(())
    }

    fn transition_to(&mut self, next: LoanStatus, action: &'static str) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(self.rejected(action));
        }
        self.status = next;
        Ok(())
    }

    fn rejected(&self, action: &'static str) -> LedgerError {
        LedgerError::InvalidStateTransition {
            loan_id: self.loan_id.clone(),
            action,
            status: self.status,
        }
    }

    fn audit(&mut self, entry: String) {
        self.audit_history.push(entry);
    }
}
