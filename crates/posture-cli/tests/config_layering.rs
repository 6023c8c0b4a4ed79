//! Integration tests for configuration layering.
//!
//! Tests the priority chain: hardcoded defaults < XDG config < project config < CLI args

#![allow(clippy::unwrap_used)] // Test code uses unwrap for brevity
#![allow(deprecated)] // cargo_bin deprecation warning

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

fn posture() -> Command {
    let mut cmd = Command::cargo_bin("posture").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_project_config_server_url_applies() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join(".posture.toml"),
        r"
[model]
server_url = 'http://127.0.0.1:9'
timeout_secs = 2
",
    )
    .unwrap();

    posture()
        .current_dir(temp_dir.path())
        .args(["check", "-vv"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("127.0.0.1:9")
                .and(predicate::str::contains("Failed to load inference model")),
        );
}

#[test]
fn test_cli_overrides_project_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join(".posture.toml"),
        r"
[model]
server_url = 'http://127.0.0.1:1'
",
    )
    .unwrap();

    posture()
        .current_dir(temp_dir.path())
        .args(["check", "-v", "--server-url", "http://127.0.0.1:9"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("via http://127.0.0.1:9")
                .and(predicate::str::contains("via http://127.0.0.1:1").not()),
        );
}

#[test]
fn test_project_config_found_in_parent_directory() {
    let temp_dir = tempfile::tempdir().unwrap();
    let nested = temp_dir.path().join("sub").join("dir");
    fs::create_dir_all(&nested).unwrap();
    fs::write(
        temp_dir.path().join(".posture.toml"),
        r"
[model]
server_url = 'http://127.0.0.1:9'
",
    )
    .unwrap();

    posture()
        .current_dir(&nested)
        .args(["check", "-v"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Loaded config"));
}

#[test]
fn test_invalid_config_value_warns_and_is_ignored() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join(".posture.toml"),
        r"
[model]
confidence_threshold = 1.5
",
    )
    .unwrap();

    posture()
        .current_dir(temp_dir.path())
        .args(["check", "--server-url", "http://127.0.0.1:9"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("model.confidence_threshold")
                .and(predicate::str::contains("ignoring configuration files")),
        );
}

#[test]
fn test_unparseable_config_warns() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join(".posture.toml"), "[model\nbroken").unwrap();

    posture()
        .current_dir(temp_dir.path())
        .args(["check", "--server-url", "http://127.0.0.1:9"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to parse config file"));
}

#[test]
fn test_config_log_level_applies() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(
        temp_dir.path().join(".posture.toml"),
        r"
[model]
server_url = 'http://127.0.0.1:9'

[log]
level = 'info'
",
    )
    .unwrap();

    posture()
        .current_dir(temp_dir.path())
        .arg("check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Loading model"));
}
