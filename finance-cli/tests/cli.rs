use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::{contains, is_match};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn cmd() -> Command {
    Command::cargo_bin("finance").unwrap()
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../finance-data/test-data")
        .join(name)
}

fn json_decimal(
    value: &serde_json::Value,
    pointer: &str,
) -> Decimal {
    value
        .pointer(pointer)
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("missing {pointer}"))
        .parse()
        .unwrap()
}

#[test]
fn salary_text_report() {
    cmd()
        .args(["salary", "--gross", "5,000,000"])
        .assert()
        .success()
        .stdout(contains("Monthly salary"))
        .stdout(is_match(r"National pension\s+225,000").unwrap())
        .stdout(is_match(r"Net salary\s+4,154,318").unwrap());
}

#[test]
fn salary_json_output() {
    let output = cmd()
        .args(["--json", "salary", "--gross", "5000000"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json_decimal(&value, "/net_salary"), dec!(4154318));
    assert_eq!(json_decimal(&value, "/insurance/total"), dec!(470204));
}

#[test]
fn salary_with_incentive() {
    cmd()
        .args(["salary", "--gross", "5000000", "--incentive", "10000000"])
        .assert()
        .success()
        .stdout(is_match(r"Net incentive\s+8,432,500").unwrap());
}

#[test]
fn salary_rejects_negative_gross() {
    cmd()
        .args(["salary", "--gross=-1"])
        .assert()
        .failure()
        .stderr(contains("gross monthly salary must not be negative"));
}

#[test]
fn salary_rejects_amount_above_ceiling() {
    cmd()
        .args(["salary", "--gross", "7000000000000000000000000000"])
        .assert()
        .failure()
        .stderr(contains("gross monthly salary must not exceed 1000000000000000"));
}

#[test]
fn net_to_gross_converges() {
    cmd()
        .args(["net-to-gross", "--target-net", "4154318"])
        .assert()
        .success()
        .stdout(is_match(r"Converged\s+yes").unwrap());
}

#[test]
fn loan_with_dsr_check() {
    cmd()
        .args([
            "loan",
            "--principal",
            "300000000",
            "--rate",
            "4",
            "--months",
            "360",
            "--income",
            "60000000",
            "--rate-type",
            "variable",
        ])
        .assert()
        .success()
        .stdout(is_match(r"DSR\s+28.64%").unwrap())
        .stdout(is_match(r"Stressed DSR\s+34.07%").unwrap())
        .stdout(is_match(r"Capacity reduction\s+66,678,954").unwrap());
}

#[test]
fn loan_schedule_table() {
    cmd()
        .args([
            "loan",
            "--principal",
            "1200000",
            "--rate",
            "0",
            "--months",
            "12",
            "--method",
            "equal-principal",
            "--schedule",
        ])
        .assert()
        .success()
        .stdout(contains("Period"))
        .stdout(is_match(r"(?m)^\s+12\s+100,000\s+0\s+100,000\s+0$").unwrap());
}

#[test]
fn loan_rejects_unknown_zone() {
    cmd()
        .args([
            "loan",
            "--principal",
            "1000000",
            "--rate",
            "4",
            "--months",
            "12",
            "--zone",
            "seoul",
        ])
        .assert()
        .failure()
        .stderr(contains("unknown zone"));
}

#[test]
fn mortgage_reports_down_payment() {
    cmd()
        .args([
            "mortgage",
            "--principal",
            "350000000",
            "--rate",
            "4",
            "--months",
            "360",
            "--property-value",
            "500000000",
            "--zone",
            "non-regulated",
        ])
        .assert()
        .success()
        .stdout(is_match(r"Down payment\s+150,000,000").unwrap())
        .stdout(is_match(r"Max loan\s+350,000,000").unwrap())
        .stdout(is_match(r"Within limit\s+yes").unwrap());
}

#[test]
fn compound_projection() {
    cmd()
        .args([
            "compound",
            "--principal",
            "10000000",
            "--monthly-deposit",
            "500000",
            "--rate",
            "5",
            "--years",
            "10",
        ])
        .assert()
        .success()
        .stdout(is_match(r"Final balance\s+94,111,235").unwrap())
        .stdout(is_match(r"Year 1\s+16,651,047").unwrap());
}

#[test]
fn pension_projection() {
    cmd()
        .args(["pension", "--income", "3000000", "--years", "30"])
        .assert()
        .success()
        .stdout(is_match(r"Monthly benefit\s+967,500").unwrap())
        .stdout(is_match(r"Break-even age\s+73.4").unwrap());
}

#[test]
fn severance_under_one_year_is_ineligible() {
    cmd()
        .args([
            "severance",
            "--start",
            "2024-01-01",
            "--end",
            "2024-12-30",
            "--salary",
            "3000000",
        ])
        .assert()
        .success()
        .stdout(is_match(r"Eligible\s+no").unwrap())
        .stderr(contains("Tenure too short"));
}

#[test]
fn severance_rejects_bad_date() {
    cmd()
        .args([
            "severance",
            "--start",
            "01/01/2024",
            "--end",
            "2025-01-01",
            "--salary",
            "3000000",
        ])
        .assert()
        .failure()
        .stderr(contains("expected YYYY-MM-DD"));
}

#[test]
fn income_tax_report() {
    cmd()
        .args([
            "income-tax",
            "--income",
            "80000000",
            "--personal",
            "1500000",
            "--national-pension",
            "3600000",
            "--insurance",
            "2000000",
            "--credit-card",
            "2500000",
        ])
        .assert()
        .success()
        .stdout(is_match(r"Total tax\s+11,699,600").unwrap())
        .stdout(is_match(r"Effective tax rate\s+14.62%").unwrap());
}

#[test]
fn capital_gains_report() {
    cmd()
        .args([
            "capital-gains",
            "--acquisition",
            "500000000",
            "--transfer",
            "700000000",
            "--acquisition-costs",
            "10000000",
            "--transfer-costs",
            "5000000",
            "--holding-years",
            "5",
        ])
        .assert()
        .success()
        .stdout(is_match(r"Capital gains tax\s+22,535,000").unwrap());
}

#[test]
fn minimum_wage_shortfall() {
    cmd()
        .args(["minimum-wage", "--hourly", "9000"])
        .assert()
        .success()
        .stdout(is_match(r"Compliant\s+no").unwrap())
        .stdout(is_match(r"Hourly shortfall\s+1,030").unwrap());
}

#[test]
fn minimum_wage_unknown_year() {
    cmd()
        .args(["minimum-wage", "--hourly", "10000", "--year", "2019"])
        .assert()
        .failure()
        .stderr(contains("no minimum wage configured for 2019"));
}

#[test]
fn tables_lists_brackets_and_rates() {
    cmd()
        .arg("tables")
        .assert()
        .success()
        .stdout(contains("Income tax brackets"))
        .stdout(contains("45% less 65,940,000"))
        .stdout(is_match(r"2025\s+10,030").unwrap());
}

#[test]
fn brackets_file_matches_built_in_result() {
    cmd()
        .arg("--brackets")
        .arg(fixture("tax_brackets_2025.csv"))
        .args(["salary", "--gross", "5000000"])
        .assert()
        .success()
        .stdout(is_match(r"Net salary\s+4,154,318").unwrap());
}

#[test]
fn config_file_overrides_rates() {
    cmd()
        .arg("--config")
        .arg(fixture("rates_2026.toml"))
        .args(["minimum-wage", "--hourly", "10600", "--year", "2027"])
        .assert()
        .success()
        .stdout(is_match(r"Compliant\s+yes").unwrap());
}

#[test]
fn missing_config_file_fails() {
    cmd()
        .args(["--config", "does-not-exist.toml", "tables"])
        .assert()
        .failure()
        .stderr(contains("Failed to load rates from does-not-exist.toml"))
        .stdout(predicate::str::is_empty());
}
