//! Integration tests for the `campusnet` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! the device registry round trip, simulation runs, and exit codes, all
//! against a throwaway state file.
#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `campusnet` binary with env isolation.
///
/// Clears all `CAMPUSNET_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn campusnet_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("campusnet");
    cmd.env("HOME", "/tmp/campusnet-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/campusnet-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/campusnet-cli-test-nonexistent")
        .env_remove("CAMPUSNET_CONFIG")
        .env_remove("CAMPUSNET_STATE")
        .env_remove("CAMPUSNET_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

/// A command bound to a state file inside `dir`.
fn with_state(dir: &Path) -> assert_cmd::Command {
    let mut cmd = campusnet_cmd();
    cmd.arg("--state")
        .arg(dir.join("state.json"))
        .arg("--config")
        .arg(dir.join("config.toml"));
    cmd
}

/// Spawnable `std` command with the same isolation as [`with_state`], for
/// runs that must stay alive while other invocations happen.
fn spawn_with_state(dir: &Path, args: &[&str]) -> std::process::Child {
    std::process::Command::new(env!("CARGO_BIN_EXE_campusnet"))
        .env("HOME", "/tmp/campusnet-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/campusnet-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/campusnet-cli-test-nonexistent")
        .env_remove("CAMPUSNET_CONFIG")
        .env_remove("CAMPUSNET_STATE")
        .env_remove("CAMPUSNET_OUTPUT")
        .env_remove("RUST_LOG")
        .arg("--state")
        .arg(dir.join("state.json"))
        .arg("--config")
        .arg(dir.join("config.toml"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap()
}

fn add_device(dir: &Path, device_id: &str) -> assert_cmd::assert::Assert {
    with_state(dir)
        .args([
            "devices",
            "add",
            "--device-id",
            device_id,
            "--name",
            "Library Level 1",
            "--zone",
            "Library",
            "--mac",
            "00-1A-2B-3C-4D-5E",
            "--status",
            "online",
            "--clients",
            "12",
        ])
        .assert()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = campusnet_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    campusnet_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("campus access points")
            .and(predicate::str::contains("simulate"))
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("traffic"))
            .and(predicate::str::contains("alerts")),
    );
}

#[test]
fn test_version_flag() {
    campusnet_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("campusnet"));
}

#[test]
fn test_invalid_duration_is_usage_error() {
    campusnet_cmd()
        .args(["simulate", "--duration", "soon"])
        .assert()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    campusnet_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    campusnet_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("campusnet"));
}

// ── Device registry ─────────────────────────────────────────────────

#[test]
fn test_device_add_list_remove() {
    let dir = tempfile::tempdir().unwrap();

    add_device(dir.path(), "AP-LIB-01").success();
    assert!(dir.path().join("state.json").exists());

    with_state(dir.path())
        .args(["devices", "list", "--output", "plain"])
        .assert()
        .success()
        .stdout("AP-LIB-01\n");

    let output = with_state(dir.path())
        .args(["devices", "list", "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let devices: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(devices[0]["deviceId"], "AP-LIB-01");
    assert_eq!(devices[0]["macAddress"], "00:1a:2b:3c:4d:5e");
    assert_eq!(devices[0]["status"], "online");
    assert_eq!(devices[0]["clients"], 12);

    with_state(dir.path())
        .args(["devices", "remove", "AP-LIB-01"])
        .assert()
        .success();

    with_state(dir.path())
        .args(["devices", "list", "--output", "json-compact"])
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn test_duplicate_device_id_is_conflict() {
    let dir = tempfile::tempdir().unwrap();
    add_device(dir.path(), "AP-HST-01").success();
    add_device(dir.path(), "AP-HST-01")
        .code(6)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_remove_missing_device_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    with_state(dir.path())
        .args(["devices", "remove", "AP-NOPE"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_malformed_mac_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    with_state(dir.path())
        .args([
            "devices",
            "add",
            "--device-id",
            "AP-1",
            "--name",
            "x",
            "--zone",
            "Hostel",
            "--mac",
            "not-a-mac",
        ])
        .assert()
        .code(2);
}

// ── Read views ──────────────────────────────────────────────────────

#[test]
fn test_empty_traffic_history() {
    let dir = tempfile::tempdir().unwrap();
    with_state(dir.path())
        .args(["traffic", "history"])
        .assert()
        .success()
        .stderr(predicate::str::contains("No traffic recorded yet"));

    with_state(dir.path())
        .args(["traffic", "history", "--output", "json"])
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn test_empty_alerts_list() {
    let dir = tempfile::tempdir().unwrap();
    with_state(dir.path())
        .args(["alerts", "list", "--output", "json-compact"])
        .assert()
        .success()
        .stdout("[]\n");
}

#[test]
fn test_corrupt_state_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("state.json"), "{ nope").unwrap();
    with_state(dir.path())
        .args(["devices", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("state.json"));
}

// ── Simulation ──────────────────────────────────────────────────────

#[test]
fn test_simulate_records_traffic_and_prints_summary() {
    let dir = tempfile::tempdir().unwrap();
    add_device(dir.path(), "AP-LIB-01").success();

    let output = with_state(dir.path())
        .args(["simulate", "--duration", "6s", "--seed", "1", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(summary["trafficTicks"].as_u64().unwrap() >= 1, "{summary}");
    assert!(summary["samplesRetained"].as_u64().unwrap() >= 1, "{summary}");

    let output = with_state(dir.path())
        .args(["traffic", "history", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let samples: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let samples = samples.as_array().unwrap();
    assert!(!samples.is_empty());
    // One online device starting at 12 clients can lose at most 2 per tick.
    assert!(samples[0]["activeUsers"].as_u64().unwrap() > 0);
}

#[test]
fn test_registry_edits_during_simulation_survive() {
    let dir = tempfile::tempdir().unwrap();
    add_device(dir.path(), "AP-LIB-01").success();

    let sim = spawn_with_state(
        dir.path(),
        &["simulate", "--duration", "8s", "--seed", "1", "--quiet"],
    );
    std::thread::sleep(Duration::from_secs(2));

    add_device(dir.path(), "AP-LIB-02").success();
    with_state(dir.path())
        .args(["devices", "remove", "AP-LIB-01"])
        .assert()
        .success();

    let output = sim.wait_with_output().unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    with_state(dir.path())
        .args(["devices", "list", "--output", "plain"])
        .assert()
        .success()
        .stdout("AP-LIB-02\n");
}

#[cfg(unix)]
#[test]
fn test_interrupt_stops_simulation_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    add_device(dir.path(), "AP-LIB-01").success();

    let sim = spawn_with_state(dir.path(), &["simulate", "--seed", "1", "-o", "json"]);
    std::thread::sleep(Duration::from_secs(6));
    let status = std::process::Command::new("kill")
        .args(["-INT", &sim.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let output = sim.wait_with_output().unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(summary["trafficTicks"].as_u64().unwrap() >= 1, "{summary}");
    assert!(dir.path().join("state.json").exists());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    with_state(dir.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(dir.path().join("config.toml").exists());

    with_state(dir.path())
        .args(["config", "init"])
        .assert()
        .code(6);

    with_state(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("flush_interval_secs"));
}

#[test]
fn test_config_path_honours_flag() {
    let dir = tempfile::tempdir().unwrap();
    with_state(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}
