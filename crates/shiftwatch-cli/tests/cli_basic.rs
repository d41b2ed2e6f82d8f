//! Basic CLI E2E tests.
//!
//! Each test runs the binary against its own temporary data directory
//! via SHIFTWATCH_DATA_DIR, so tests never touch a real roster and can
//! run in parallel.

use std::path::Path;
use std::process::Command;

fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "shiftwatch-cli", "--"])
        .args(args)
        .env("SHIFTWATCH_DATA_DIR", data_dir)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_cli_success(data_dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(data_dir, args);
    assert_eq!(code, 0, "CLI command failed: {args:?}\nstderr: {stderr}");
    stdout
}

#[test]
fn shift_round_trip_persists_across_invocations() {
    let dir = tempfile::tempdir().unwrap();

    let out = run_cli_success(
        dir.path(),
        &["shift", "start", "--employee", "u1", "--name", "Linh"],
    );
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["result"]["type"], "shift_started");

    // A separate process sees the open shift and can close it.
    let out = run_cli_success(dir.path(), &["shift", "end", "--employee", "u1"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["result"]["type"], "shift_ended");
    assert!(parsed["result"]["summary"]["net_secs"].is_i64());
}

#[test]
fn break_flow() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["shift", "start", "--employee", "u1"]);

    let out = run_cli_success(
        dir.path(),
        &["break", "start", "ve_sinh", "--employee", "u1"],
    );
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["result"]["type"], "break_started");
    assert_eq!(parsed["result"]["kind"], "ve_sinh");

    let out = run_cli_success(dir.path(), &["break", "end", "--employee", "u1"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["result"]["type"], "break_ended");
}

#[test]
fn invalid_transition_is_a_clean_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["shift", "end", "--employee", "u1"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("no shift in progress"), "stderr: {stderr}");
}

#[test]
fn unknown_break_kind_is_a_policy_error() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["shift", "start", "--employee", "u1"]);
    let (_, stderr, code) = run_cli(
        dir.path(),
        &["break", "start", "ngu_trua", "--employee", "u1"],
    );
    assert_ne!(code, 0);
    assert!(stderr.contains("no configured allowance"), "stderr: {stderr}");
}

#[test]
fn reports_emit_json() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["shift", "start", "--employee", "u1"]);

    let out = run_cli_success(dir.path(), &["report", "summary"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["employees"], 1);
    assert_eq!(parsed["working"], 1);

    let out = run_cli_success(dir.path(), &["report", "today"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(parsed["employees"].is_array());
}

#[test]
fn sweep_close_ends_every_open_shift() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["shift", "start", "--employee", "u1"]);
    run_cli_success(dir.path(), &["shift", "start", "--employee", "u2"]);

    let out = run_cli_success(dir.path(), &["sweep", "close"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["closed"].as_array().unwrap().len(), 2);

    let out = run_cli_success(dir.path(), &["report", "summary"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(parsed["working"], 0);
}

#[test]
fn policy_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    run_cli_success(dir.path(), &["policy", "init"]);
    assert!(dir.path().join("policy.toml").exists());

    let out = run_cli_success(dir.path(), &["policy", "show"]);
    let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(parsed["breaks"]["ve_sinh"]["allowed_minutes"].is_i64());
}
