use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const RECEIPT: &str = "CORNER MARKET\nApril 5, 2024\nMilk $3.50\nBread $2.25\nSubtotal $5.75\nTotal $6.10\n";

fn fintrack(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("fintrack").unwrap();
    cmd.env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .arg("--db")
        .arg(dir.path().join("test.db"));
    cmd
}

fn write_receipt(dir: &Path, name: &str, text: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path.display().to_string()
}

#[test]
fn extract_text_receipt() {
    let dir = TempDir::new().unwrap();
    let receipt = write_receipt(dir.path(), "receipt.txt", "Coffee $3.00\nTOTAL $50.00\nApril 5, 2024");

    fintrack(&dir)
        .args(["extract", &receipt])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalAmount\": \"50.00\""))
        .stdout(predicate::str::contains("\"transactionDate\": \"2024-04-05\""))
        .stdout(predicate::str::contains("\"type\": \"expense\""));
}

#[test]
fn extract_from_stdin_defaults_date() {
    let dir = TempDir::new().unwrap();

    fintrack(&dir)
        .args(["extract", "-", "--today", "2024-06-01", "--format", "csv"])
        .write_stdin("Coffee $3.00\nMuffin $2.50\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("5.50,2024-06-01,,Imported from receipt,expense"))
        .stderr(predicate::str::contains("No total line found"));
}

#[test]
fn extract_reports_missing_amount() {
    let dir = TempDir::new().unwrap();
    let receipt = write_receipt(dir.path(), "note.txt", "thank you for shopping");

    fintrack(&dir)
        .args(["extract", &receipt, "--today", "2024-06-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"totalAmount\": null"))
        .stderr(predicate::str::contains("No dollar amounts found"));
}

#[test]
fn extract_rejects_unsupported_file() {
    let dir = TempDir::new().unwrap();
    let receipt = write_receipt(dir.path(), "receipt.docx", "Total $5.00");

    fintrack(&dir)
        .args(["extract", &receipt])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported receipt format"));
}

#[test]
fn add_and_list_transactions() {
    let dir = TempDir::new().unwrap();

    fintrack(&dir)
        .args(["tx", "add", "--amount", "12.50", "--category", "Travel", "--date", "2024-01-05"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Transaction 1"));

    fintrack(&dir)
        .args(["tx", "add", "--type", "income", "--amount", "100", "--category", "Salary", "--date", "2024-01-31"])
        .assert()
        .success();

    fintrack(&dir)
        .args(["tx", "list", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("+100.00"))
        .stdout(predicate::str::contains("Page 1 of 2 (2 transactions)"));

    fintrack(&dir)
        .args(["--user", "2", "tx", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No transactions found."));
}

#[test]
fn add_rejects_amount_over_cap() {
    let dir = TempDir::new().unwrap();

    fintrack(&dir)
        .args(["tx", "add", "--amount", "100000000", "--category", "Salary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not exceed 99,999,999.99"));
}

#[test]
fn import_receipt_with_category() {
    let dir = TempDir::new().unwrap();
    let receipt = write_receipt(dir.path(), "market.txt", RECEIPT);

    fintrack(&dir)
        .args(["import", &receipt, "--category", "Food & Dining", "--no-copy", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"amount\": \"5.75\""))
        .stdout(predicate::str::contains("\"description\": \"Imported from receipt\""))
        .stdout(predicate::str::contains("market.txt"));
}

#[test]
fn import_requires_category() {
    let dir = TempDir::new().unwrap();
    let receipt = write_receipt(dir.path(), "market.txt", RECEIPT);

    fintrack(&dir)
        .args(["import", &receipt, "--no-copy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A category is required"));
}

#[test]
fn import_requires_amount_when_none_found() {
    let dir = TempDir::new().unwrap();
    let receipt = write_receipt(dir.path(), "blank.txt", "no prices here");

    fintrack(&dir)
        .args(["import", &receipt, "--category", "Shopping", "--no-copy"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pass --amount"));

    fintrack(&dir)
        .args(["import", &receipt, "--category", "Shopping", "--amount", "4.20", "--no-copy"])
        .assert()
        .success();
}

#[test]
fn delete_unknown_transaction_fails() {
    let dir = TempDir::new().unwrap();

    fintrack(&dir)
        .args(["tx", "delete", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn categories_by_type() {
    let dir = TempDir::new().unwrap();

    fintrack(&dir)
        .args(["categories", "--type", "income"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Salary"))
        .stdout(predicate::str::contains("Travel").not());
}

#[test]
fn analytics_summary_balance() {
    let dir = TempDir::new().unwrap();

    for (kind, amount, category) in [("income", "200", "Salary"), ("expense", "50.25", "Travel")] {
        fintrack(&dir)
            .args(["tx", "add", "--type", kind, "--amount", amount, "--category", category])
            .assert()
            .success();
    }

    fintrack(&dir)
        .args(["analytics", "summary", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"balance\": \"149.75\""));
}

#[test]
fn config_init_and_get() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("fintrack.json");
    let config = config.to_str().unwrap();

    fintrack(&dir)
        .args(["--config", config, "config", "init"])
        .assert()
        .success();

    fintrack(&dir)
        .args(["--config", config, "config", "get", "upload.max_file_size"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5242880"));

    fintrack(&dir)
        .args(["--config", config, "config", "set", "listing.page_size", "25"])
        .assert()
        .success();

    fintrack(&dir)
        .args(["--config", config, "config", "get", "listing.page_size"])
        .assert()
        .success()
        .stdout(predicate::str::contains("25"));
}
