use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

#[test]
fn test_cli_end_to_end() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin!());
    cmd.arg("tests/fixtures/lifecycle.csv")
        .arg("--clock")
        .arg("2024-01-15T10:00:00Z");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""function":"CheckLoanStatus","result":"PENDING""#))
        .stdout(predicate::str::contains(r#""function":"GetBalance","result":"499000""#))
        .stdout(predicate::str::contains(r#""function":"CheckLoanStatus","result":"REPAID""#))
        .stdout(predicate::str::contains("account,balance"))
        .stdout(predicate::str::contains("B1,0"))
        .stdout(predicate::str::contains("HDFC,500100"))
        .stdout(predicate::str::contains("SBI,499900"))
        .stderr(predicate::str::contains("Error").not());

    Ok(())
}

#[test]
fn test_cli_custom_genesis() {
    let file = common::invocations_file(&["InitLedger", "GetBalance, SBI", "GetBalance, HDFC"])
        .unwrap();

    let mut cmd = Command::new(cargo_bin!("lendchain"));
    cmd.arg(file.path())
        .arg("--genesis")
        .arg("tests/fixtures/genesis.toml");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""result":"500000""#))
        .stdout(predicate::str::contains("RBI,1000000"))
        .stdout(predicate::str::contains("SBI").not())
        .stderr(predicate::str::contains("[NotFound] account SBI does not exist"));
}

#[test]
fn test_cli_get_loan_outputs_record() {
    let file = common::invocations_file(&[
        "InitLedger",
        "RequestLoan, L7, B7, 250, 4, 6,\"bike, red\"",
        "GetLoan, L7",
    ])
    .unwrap();

    let mut cmd = Command::new(cargo_bin!("lendchain"));
    cmd.arg(file.path()).arg("--clock").arg("2024-01-31T00:00:00Z");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(r#""loanId":"L7""#))
        .stdout(predicate::str::contains(r#""repaymentDue":"260.00""#))
        .stdout(predicate::str::contains(r#""collateral":"bike, red""#))
        .stdout(predicate::str::contains(r#""dueDate":"2024-07-31T00:00:00Z""#));
}

mod common;
