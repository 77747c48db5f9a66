//! End-to-end tests for the CLI binary surface.
//!
//! These exercise argument handling only; nothing here touches the
//! network.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_cli_help_describes_the_tool() {
    Command::cargo_bin("linkscout")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--filetype"))
        .stdout(predicate::str::contains("--mode"));
}

#[test]
fn test_cli_version_prints_crate_version() {
    Command::cargo_bin("linkscout")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_missing_filename_fails_with_usage() {
    Command::cargo_bin("linkscout")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_unknown_mode_fails() {
    Command::cargo_bin("linkscout")
        .unwrap()
        .args(["Dune", "--mode", "rental"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown search mode"));
}
