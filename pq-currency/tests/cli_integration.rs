//! CLI integration tests for pq-currency

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command with config and storage isolated inside `temp_dir`
fn pq_currency(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pq-currency").unwrap();
    cmd.env("PRINTQUOTE_CONFIG", temp_dir.path().join("config.toml"))
        .env("PRINTQUOTE_STORAGE", temp_dir.path().join("preferences.json"))
        .env_remove("PRINTQUOTE_API_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_format_defaults_to_usd() {
    let temp_dir = TempDir::new().unwrap();

    pq_currency(&temp_dir)
        .args(["format", "1234.9"])
        .assert()
        .success()
        .stdout("$1,234.90\n");
}

#[test]
fn test_format_fcfa() {
    let temp_dir = TempDir::new().unwrap();

    pq_currency(&temp_dir)
        .args(["format", "1234.9", "--currency", "FCFA"])
        .assert()
        .success()
        .stdout("1,235 FCFA\n");
}

#[test]
fn test_format_negative_eur() {
    let temp_dir = TempDir::new().unwrap();

    pq_currency(&temp_dir)
        .args(["format", "-5", "--currency", "EUR"])
        .assert()
        .success()
        .stdout("-€5.00\n");
}

#[test]
fn test_format_unknown_code_is_usd() {
    let temp_dir = TempDir::new().unwrap();

    pq_currency(&temp_dir)
        .args(["format", "0", "--currency", "ZZZ"])
        .assert()
        .success()
        .stdout("$0.00\n");
}

#[test]
fn test_set_then_get_and_format() {
    let temp_dir = TempDir::new().unwrap();

    pq_currency(&temp_dir)
        .args(["set", "GBP"])
        .assert()
        .success()
        .stdout("GBP\n");

    pq_currency(&temp_dir)
        .arg("get")
        .assert()
        .success()
        .stdout("GBP\n");

    pq_currency(&temp_dir)
        .args(["format", "12.5"])
        .assert()
        .success()
        .stdout("£12.50\n");

    let stored = fs::read_to_string(temp_dir.path().join("preferences.json")).unwrap();
    assert!(stored.contains(r#""preferredCurrency": "GBP""#));
}

#[test]
fn test_set_rejects_unknown_code() {
    let temp_dir = TempDir::new().unwrap();

    pq_currency(&temp_dir)
        .args(["set", "XAF"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("Invalid currency"));
}

#[test]
fn test_corrupted_preference_reads_as_usd() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("preferences.json"),
        r#"{"preferredCurrency": "DOGE"}"#,
    )
    .unwrap();

    pq_currency(&temp_dir)
        .arg("get")
        .assert()
        .success()
        .stdout("USD\n");
}

#[test]
fn test_init_uses_configured_default_once() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("config.toml"),
        "[defaults]\ncurrency = \"CAD\"\n",
    )
    .unwrap();

    pq_currency(&temp_dir)
        .arg("init")
        .assert()
        .success()
        .stdout("CAD\n");

    pq_currency(&temp_dir).args(["set", "EUR"]).assert().success();

    // An existing preference is left alone
    pq_currency(&temp_dir)
        .arg("init")
        .assert()
        .success()
        .stdout("EUR\n");
}

#[test]
fn test_info_json_lists_all_currencies() {
    let temp_dir = TempDir::new().unwrap();

    let output = pq_currency(&temp_dir)
        .args(["info", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[1]["code"], "FCFA");
    assert_eq!(rows[1]["example"], "1,235 FCFA");
    assert_eq!(rows[4]["symbol"], "C$");
}

#[test]
fn test_info_single_code() {
    let temp_dir = TempDir::new().unwrap();

    pq_currency(&temp_dir)
        .args(["info", "eur"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Euro"))
        .stdout(predicate::str::contains("€1,234.50"));
}

#[test]
fn test_malformed_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("config.toml"), "[api\n").unwrap();

    pq_currency(&temp_dir)
        .arg("get")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config"));
}

#[test]
fn test_set_recovers_from_corrupt_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("preferences.json"), "{ truncated").unwrap();

    pq_currency(&temp_dir)
        .args(["set", "EUR"])
        .assert()
        .success()
        .stdout("EUR\n");

    pq_currency(&temp_dir)
        .arg("get")
        .assert()
        .success()
        .stdout("EUR\n");

    let backup = fs::read_to_string(temp_dir.path().join("preferences.json.corrupt")).unwrap();
    assert_eq!(backup, "{ truncated");
}

#[test]
fn test_set_fails_when_storage_is_unusable() {
    let temp_dir = TempDir::new().unwrap();
    // A directory where the preferences file should be
    fs::create_dir(temp_dir.path().join("preferences.json")).unwrap();

    pq_currency(&temp_dir)
        .args(["set", "EUR"])
        .assert()
        .failure()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("Storage error"));
}
