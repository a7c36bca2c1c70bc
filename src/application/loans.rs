use super::tokens::TokenLedger;
use crate::domain::loan::{Loan, LoanStatus, LoanTerms};
use crate::domain::ports::WorldState;
use crate::domain::record::{load, save};
use crate::domain::token::Amount;
use crate::error::{LedgerError, Result};
use tracing::{debug, info};

/// Drives loans through their lifecycle.
///
/// Every operation reads the loan fresh from the world state, checks all of its
/// preconditions, moves funds through the [`TokenLedger`] where needed, and only
/// then writes the updated loan back. A failure at any point returns before the
/// loan is written, and the host discards whatever the invocation buffered.
pub struct LoanEngine<'a> {
    state: &'a mut dyn WorldState,
}

impl<'a> LoanEngine<'a> {
    pub fn new(state: &'a mut dyn WorldState) -> Self {
        Self { state }
    }

    pub async fn request_loan(&mut self, terms: LoanTerms) -> Result<Loan> {
        if self.exists(&terms.loan_id).await? {
            return Err(LedgerError::AlreadyExists(format!("loan {}", terms.loan_id)));
        }

        let loan = Loan::request(terms, self.state.tx_timestamp(), self.state.tx_id())?;
        save(&mut *self.state, &loan)?;

        info!(
            loan_id = %loan.loan_id,
            borrower = %loan.borrower_id,
            amount = %loan.amount,
            repayment_due = %loan.repayment_due,
            tx_id = %self.state.tx_id(),
            "loan requested"
        );
        Ok(loan)
    }

    /// Assigns a lender after checking they can fund the principal.
    pub async fn approve_loan(&mut self, loan_id: &str, lender_id: &str) -> Result<Loan> {
        let mut loan = self.get_loan(loan_id).await?;
        loan.require_status(LoanStatus::Pending, "approved")?;
        if lender_id == loan.borrower_id {
            return Err(LedgerError::InvalidArgument(format!(
                "borrower {lender_id} cannot approve their own loan"
            )));
        }

        let available = TokenLedger::new(&mut *self.state).balance(lender_id).await?;
        if available < loan.amount {
            return Err(LedgerError::InsufficientFunds(lender_id.to_string()));
        }

        let tx_id = self.state.tx_id().to_string();
        loan.approve(lender_id, &tx_id)?;
        save(&mut *self.state, &loan)?;

        info!(loan_id, lender = lender_id, tx_id = %tx_id, "loan approved");
        Ok(loan)
    }

    /// Pays the principal out to the borrower and activates the loan.
    pub async fn disburse_loan(&mut self, loan_id: &str) -> Result<Loan> {
        let mut loan = self.get_loan(loan_id).await?;
        loan.require_status(LoanStatus::Approved, "disbursed")?;
        let principal = Amount::new(loan.amount)?;

        TokenLedger::new(&mut *self.state)
            .transfer(&loan.lender_id, &loan.borrower_id, principal)
            .await?;

        let tx_id = self.state.tx_id().to_string();
        loan.disburse(self.state.tx_timestamp(), &tx_id)?;
        save(&mut *self.state, &loan)?;

        info!(loan_id, amount = %principal, tx_id = %tx_id, "loan disbursed");
        Ok(loan)
    }

    /// Moves a repayment from borrower to lender and reduces what is owed.
    pub async fn repay_loan(&mut self, loan_id: &str, amount: Amount) -> Result<Loan> {
        let mut loan = self.get_loan(loan_id).await?;
        loan.validate_repayment(amount)?;

        TokenLedger::new(&mut *self.state)
            .transfer(&loan.borrower_id, &loan.lender_id, amount)
            .await?;

        let tx_id = self.state.tx_id().to_string();
        loan.repay(amount, &tx_id)?;
        save(&mut *self.state, &loan)?;

        info!(
            loan_id,
            amount = %amount,
            remaining = %loan.remaining_balance,
            status = %loan.status,
            tx_id = %tx_id,
            "loan repayment applied"
        );
        Ok(loan)
    }

    pub async fn mark_as_defaulted(&mut self, loan_id: &str) -> Result<Loan> {
        let mut loan = self.get_loan(loan_id).await?;
        let tx_id = self.state.tx_id().to_string();
        loan.mark_defaulted(&tx_id)?;
        save(&mut *self.state, &loan)?;

        info!(loan_id, remaining = %loan.remaining_balance, tx_id = %tx_id, "loan defaulted");
        Ok(loan)
    }

    pub async fn add_collateral(&mut self, loan_id: &str, collateral: &str) -> Result<Loan> {
        let mut loan = self.get_loan(loan_id).await?;
        let tx_id = self.state.tx_id().to_string();
        loan.set_collateral(collateral, &tx_id);
        save(&mut *self.state, &loan)?;

        info!(loan_id, tx_id = %tx_id, "collateral updated");
        Ok(loan)
    }

    pub async fn get_loan(&mut self, loan_id: &str) -> Result<Loan> {
        let loan = load::<Loan>(&mut *self.state, loan_id)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("loan {loan_id}")))?;
        debug!(loan_id, status = %loan.status, "loan read");
        Ok(loan)
    }

    pub async fn loan_history(&mut self, loan_id: &str) -> Result<Vec<String>> {
        Ok(self.get_loan(loan_id).await?.audit_history)
    }

    pub async fn loan_status(&mut self, loan_id: &str) -> Result<LoanStatus> {
        Ok(self.get_loan(loan_id).await?.status)
    }

    pub async fn exists(&mut self, loan_id: &str) -> Result<bool> {
        Ok(load::<Loan>(&mut *self.state, loan_id).await?.is_some())
    }
}
