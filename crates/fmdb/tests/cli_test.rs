//! Integration tests for the `fmdb` CLI binary.
//!
//! Argument parsing, help output and error exit codes, plus a few commands
//! run against a mock document store.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `fmdb` binary with env isolation.
///
/// Clears the `FMDB_*` and legacy `DB_*` variables and points config
/// directories at a nonexistent path so tests never read a real config.
fn fmdb_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fmdb");
    cmd.env("HOME", "/tmp/fmdb-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/fmdb-cli-test-nonexistent")
        .env_remove("FMDB_PROFILE")
        .env_remove("FMDB_ADDRESS")
        .env_remove("FMDB_USERNAME")
        .env_remove("FMDB_PASSWORD")
        .env_remove("FMDB_OUTPUT")
        .env_remove("FMDB_INSECURE")
        .env_remove("FMDB_TIMEOUT")
        .env_remove("DB_ADDRESS")
        .env_remove("DB_USERNAME")
        .env_remove("DB_PASSWORD");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = fmdb_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    fmdb_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Browse and edit buildings")
            .and(predicate::str::contains("buildings"))
            .and(predicate::str::contains("rooms"))
            .and(predicate::str::contains("device-types")),
    );
}

#[test]
fn test_version_flag() {
    fmdb_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fmdb"));
}

#[test]
fn test_unknown_output_format_is_rejected() {
    fmdb_cmd()
        .args(["buildings", "list", "-o", "yaml"])
        .assert()
        .code(2);
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_config_path_prints_toml_location() {
    fmdb_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_missing_store_address_is_explained() {
    let output = fmdb_cmd().args(["buildings", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(
        text.contains("No document store configured"),
        "Expected config hint in output:\n{text}"
    );
}

#[test]
fn test_delete_without_terminal_needs_yes() {
    fmdb_cmd()
        .args(["buildings", "delete", "ITB", "--address", "http://127.0.0.1:9"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

// ── Against a store ─────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_buildings_list_plain() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/buildings/_find"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "docs": [
                { "_id": "ITB", "_rev": "1-a", "name": "IT Building" },
                { "_id": "LIB", "_rev": "1-b", "name": "Library" }
            ]
        })))
        .mount(&server)
        .await;

    fmdb_cmd()
        .args(["buildings", "list", "-o", "plain", "--address", server.uri().as_str()])
        .assert()
        .success()
        .stdout("ITB\nLIB\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_device_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/devices/ITB-1101-CP1"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "error": "not_found", "reason": "missing" })),
        )
        .mount(&server)
        .await;

    fmdb_cmd()
        .args(["devices", "get", "ITB-1101-CP1", "--address", server.uri().as_str()])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("devices list"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_room_in_missing_building_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/buildings/ITB"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "error": "not_found", "reason": "missing" })),
        )
        .mount(&server)
        .await;

    fmdb_cmd()
        .args([
            "rooms",
            "create",
            "ITB-1101",
            "--name",
            "Lab",
            "--address",
            server.uri().as_str(),
        ])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("does not exist"));

    let writes = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.method.as_str() != "GET")
        .count();
    assert_eq!(writes, 0);
}
