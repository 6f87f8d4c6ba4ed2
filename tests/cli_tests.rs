//! Integration tests for the CLI interface

use assert_cmd::Command;
use ncload::testing::{sample_variables_json, write_variables};
use predicates::prelude::*;
use tempfile::TempDir;

fn ncload() -> Command {
    Command::cargo_bin("ncload").unwrap()
}

#[test]
fn test_cli_help_flag() {
    ncload()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("diff"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_run_help_lists_options() {
    ncload()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--lenient-listing"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn test_invalid_command() {
    ncload()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error:"));
}

#[test]
fn test_validate_accepts_sample_configuration() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_variables(temp_dir.path(), &sample_variables_json());

    ncload()
        .arg("validate")
        .arg("--variables")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("is valid: 2 feature(s) -> climate"));
}

#[test]
fn test_validate_uses_working_directory_by_default() {
    let temp_dir = TempDir::new().unwrap();
    write_variables(temp_dir.path(), &sample_variables_json());

    ncload()
        .current_dir(temp_dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("variables.json is valid"));
}

#[test]
fn test_validate_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();

    ncload()
        .arg("validate")
        .arg("--variables")
        .arg(temp_dir.path().join("variables.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_validate_rejects_unmapped_feature() {
    let temp_dir = TempDir::new().unwrap();
    let mut json: serde_json::Value = serde_json::from_str(&sample_variables_json()).unwrap();
    json["etl"]["features"] = serde_json::json!(["temperature", "pressure"]);
    let path = write_variables(temp_dir.path(), &json.to_string());

    ncload()
        .args(["validate", "--variables"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("pressure"));
}

#[test]
fn test_run_fails_fast_on_malformed_configuration() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_variables(temp_dir.path(), "{ \"etl\": ");

    ncload()
        .args(["run", "--variables"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Malformed configuration"));
}

#[test]
fn test_diff_requires_configuration() {
    let temp_dir = TempDir::new().unwrap();

    ncload()
        .current_dir(temp_dir.path())
        .arg("diff")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}
