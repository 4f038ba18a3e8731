//! CLI integration tests for table-fetcher.
//!
//! These tests verify command-line argument parsing, help output,
//! and exit codes for error conditions that occur before any connection.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

/// Get a command for the table-fetcher binary.
fn cmd() -> Command {
    Command::cargo_bin("table-fetcher").unwrap()
}

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

// =============================================================================
// Help and Version Tests
// =============================================================================

#[test]
fn test_help_shows_all_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tables"))
        .stdout(predicate::str::contains("columns"))
        .stdout(predicate::str::contains("describe"))
        .stdout(predicate::str::contains("browse"))
        .stdout(predicate::str::contains("rule"))
        .stdout(predicate::str::contains("health-check"));
}

#[test]
fn test_version_flag() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("table-fetcher"));
}

#[test]
fn test_tables_subcommand_help() {
    cmd()
        .args(["tables", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--schema"))
        .stdout(predicate::str::contains("--like"));
}

#[test]
fn test_browse_subcommand_help() {
    cmd()
        .args(["browse", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--sql"))
        .stdout(predicate::str::contains("--dialect"));
}

#[test]
fn test_rule_subcommand_help() {
    cmd()
        .args(["rule", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--sql"))
        .stdout(predicate::str::contains("--rows"));
}

#[test]
fn test_describe_requires_table() {
    cmd()
        .arg("describe")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--table"));
}

// =============================================================================
// Global Flags Tests
// =============================================================================

#[test]
fn test_global_flag_defaults() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--output-json"))
        .stdout(predicate::str::contains("[default: config.yaml]"))
        .stdout(predicate::str::contains("[default: text]"))
        .stdout(predicate::str::contains("[default: info]"));
}

#[test]
fn test_short_config_flag() {
    cmd()
        .args(["-c", "some_config.yaml", "--help"])
        .assert()
        .success();
}

// =============================================================================
// Exit Code Tests - Config Errors (Exit Code 1)
// =============================================================================

#[test]
fn test_missing_config_exits_with_code_7() {
    // Missing file is an IO error (code 7), not config error (code 1)
    cmd()
        .args(["--config", "nonexistent_config_file.yaml", "health-check"])
        .assert()
        .code(7);
}

#[test]
fn test_invalid_yaml_exits_with_code_1() {
    let file = config_file("invalid: yaml: content: [\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1);
}

#[test]
fn test_empty_config_exits_with_code_1() {
    let file = tempfile::NamedTempFile::new().unwrap();

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "tables"])
        .assert()
        .code(1);
}

#[test]
fn test_unsupported_type_exits_with_code_1() {
    let file = config_file(
        "datasource:\n  type: db2\n  host: localhost\n  database: app\n  user: reader\n",
    );

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "tables"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("db2"));
}

#[test]
fn test_missing_host_exits_with_code_1() {
    let file = config_file("datasource:\n  type: mysql\n  host: \"\"\n  database: app\n  user: reader\n");

    cmd()
        .args(["--config", file.path().to_str().unwrap(), "health-check"])
        .assert()
        .code(1);
}

#[test]
fn test_unknown_browse_dialect_exits_with_code_1() {
    let file = config_file(
        "datasource:\n  type: mysql\n  host: localhost\n  database: app\n  user: reader\n",
    );

    cmd()
        .args([
            "--config",
            file.path().to_str().unwrap(),
            "browse",
            "--sql",
            "SELECT * FROM t",
            "--dialect",
            "sqlite",
        ])
        .assert()
        .code(1);
}

// =============================================================================
// No Subcommand Tests
// =============================================================================

#[test]
fn test_no_subcommand_shows_help() {
    cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}
