//! Smoke tests to verify command wiring. None of these reach a database.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn poststore() -> Command {
    Command::cargo_bin("poststore").unwrap()
}

#[test]
fn test_help_lists_operations() {
    poststore()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("page"))
        .stdout(predicate::str::contains("etag"));
}

#[test]
fn test_create_help() {
    poststore()
        .args(["create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hashtags are extracted"));
}

#[test]
fn test_page_help() {
    poststore()
        .args(["page", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("at most 1000"));
}

#[test]
fn test_search_help() {
    poststore()
        .args(["search", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exact tag matches"));
}

#[test]
fn test_channel_join_help() {
    poststore()
        .args(["channel", "join", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("User id"));
}

#[test]
fn test_search_requires_terms() {
    poststore()
        .args(["search", "--team", "t", "--user", "u"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_parent_requires_root() {
    poststore()
        .args([
            "create", "--channel", "c", "--user", "u", "-m", "hi", "--parent", "p",
        ])
        .assert()
        .failure();
}

#[test]
fn test_missing_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    poststore()
        .arg("--config")
        .arg(&missing)
        .args(["etag", "channel"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_malformed_config_file_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "max_connections = [").unwrap();

    poststore()
        .arg("--config")
        .arg(file.path())
        .args(["etag", "channel"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}
