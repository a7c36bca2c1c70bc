use chrono::{TimeZone, Utc};
use lendchain::domain::loan::{Loan, LoanStatus, LoanTerms};
use lendchain::domain::record::StateRecord;
use lendchain::domain::token::{Amount, TokenBalance};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn decimal(cents: u64) -> Decimal {
    Decimal::new(cents as i64, 2)
}

fn active_loan(principal_cents: u64, rate: u32, duration: u32) -> Loan {
    let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let terms = LoanTerms {
        loan_id: "L1".to_string(),
        borrower_id: "B1".to_string(),
        amount: Amount::new(decimal(principal_cents)).unwrap(),
        interest_rate: Decimal::from(rate),
        duration,
        collateral: String::new(),
    };
    let mut loan = Loan::request(terms, at, "tx0").unwrap();
    loan.approve("HDFC", "tx1").unwrap();
    loan.disburse(at, "tx2").unwrap();
    loan
}

proptest! {
    #[test]
    fn remaining_balance_stays_within_bounds(
        principal in 1u64..10_000_000,
        rate in 0u32..50,
        duration in 1u32..360,
        payments in prop::collection::vec(1u64..5_000_000, 1..20),
    ) {
        let mut loan = active_loan(principal, rate, duration);
        let due = loan.repayment_due;

        for cents in payments {
            let before = loan.clone();
            let amount = Amount::new(decimal(cents)).unwrap();
            match loan.repay(amount, "tx") {
                Ok(()) => prop_assert!(loan.remaining_balance < before.remaining_balance),
                Err(_) => prop_assert_eq!(&loan, &before),
            }
            prop_assert!(loan.remaining_balance >= Decimal::ZERO);
            prop_assert!(loan.remaining_balance <= due);
            prop_assert_eq!(loan.repayment_due, due);
            prop_assert!(loan.check_invariants().is_ok());
            if loan.status == LoanStatus::Repaid {
                prop_assert_eq!(loan.remaining_balance, Decimal::ZERO);
            }
        }
    }

    #[test]
    fn failed_debits_change_nothing(start in 0u64..1_000_000, take in 1u64..2_000_000) {
        let mut balance = TokenBalance::new("A", decimal(start));
        let result = balance.debit(Amount::new(decimal(take)).unwrap());
        if take > start {
            prop_assert!(result.is_err());
            prop_assert_eq!(balance.balance, decimal(start));
        } else {
            prop_assert!(result.is_ok());
            prop_assert_eq!(balance.balance, decimal(start - take));
        }
        prop_assert!(balance.balance >= Decimal::ZERO);
    }

    #[test]
    fn loan_records_survive_encoding(
        principal in 1u64..10_000_000,
        rate in 0u32..50,
        repaid in 0u64..100,
    ) {
        let mut loan = active_loan(principal, rate, 12);
        if repaid > 0 {
            let _ = loan.repay(Amount::new(decimal(repaid)).unwrap(), "tx3");
        }
        let decoded = Loan::from_bytes(&loan.to_bytes().unwrap()).unwrap();
        prop_assert_eq!(decoded, loan);
    }
}
