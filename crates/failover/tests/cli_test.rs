//! Integration tests for the `dhcp-failover` binary.
//!
//! Argument parsing, configuration failures and a single offline cycle,
//! without any live Pi-hole.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the binary with env isolation.
///
/// Clears every variable the daemon reads and points the config directory
/// at a nonexistent path so tests never pick up a real configuration.
fn failover_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("dhcp-failover");
    cmd.env("HOME", "/tmp/dhcp-failover-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/dhcp-failover-test-nonexistent")
        .env_remove("DHCP_FAILOVER_CONFIG")
        .env_remove("LOG_FORMAT")
        .env_remove("RUST_LOG");
    for key in failover_config::ENV_KEYS {
        cmd.env_remove(key);
    }
    cmd
}

/// A localhost address with nothing listening on it.
fn dead_address() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("127.0.0.1:{port}")
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    failover_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("--once")
            .and(predicate::str::contains("--dry-run"))
            .and(predicate::str::contains("--config")),
    );
}

#[test]
fn test_version_flag() {
    failover_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dhcp-failover"));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    failover_cmd().arg("--frobnicate").assert().code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_missing_configuration_exits_with_config_code() {
    let output = failover_cmd().arg("--once").output().unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("PRIMARY_PIHOLE_IP"), "output:\n{text}");
}

#[test]
fn test_partial_tertiary_exits_with_config_code() {
    let output = failover_cmd()
        .args(["--once", "--dry-run"])
        .env("PRIMARY_PIHOLE_IP", "10.0.0.2")
        .env("PRIMARY_PIHOLE_TOKEN", "a")
        .env("SECONDARY_PIHOLE_IP", "10.0.0.3")
        .env("SECONDARY_PIHOLE_TOKEN", "b")
        .env("TERTIARY_PIHOLE_TOKEN", "c")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let text = combined_output(&output);
    assert!(text.contains("TERTIARY_PIHOLE_IP"), "output:\n{text}");
}

#[test]
fn test_malformed_interval_exits_with_config_code() {
    failover_cmd()
        .arg("--once")
        .env("PRIMARY_PIHOLE_IP", "10.0.0.2")
        .env("PRIMARY_PIHOLE_TOKEN", "a")
        .env("SECONDARY_PIHOLE_IP", "10.0.0.3")
        .env("SECONDARY_PIHOLE_TOKEN", "b")
        .env("CHECK_INTERVAL", "every-minute")
        .assert()
        .code(3);
}

#[test]
fn test_missing_config_file_exits_with_config_code() {
    let dir = tempfile::tempdir().unwrap();
    failover_cmd()
        .args(["--once", "--config"])
        .arg(dir.path().join("absent.toml"))
        .assert()
        .code(3);
}

// ── Single cycle ────────────────────────────────────────────────────

#[test]
fn test_once_with_all_appliances_down_exits_cleanly() {
    let output = failover_cmd()
        .args(["--once", "--dry-run"])
        .env("PRIMARY_PIHOLE_IP", dead_address())
        .env("PRIMARY_PIHOLE_TOKEN", "a")
        .env("SECONDARY_PIHOLE_IP", dead_address())
        .env("SECONDARY_PIHOLE_TOKEN", "b")
        .env("CHECK_INTERVAL", "10")
        .env("REQUEST_TIMEOUT", "2")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    let text = combined_output(&output);
    assert!(text.contains("all appliances unreachable"), "output:\n{text}");
}

#[test]
fn test_once_reads_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        format!(
            "primary_pihole_ip = \"{}\"\nprimary_pihole_token = \"a\"\n\
             secondary_pihole_ip = \"{}\"\nsecondary_pihole_token = \"b\"\n\
             request_timeout = 1\n",
            dead_address(),
            dead_address()
        ),
    )
    .unwrap();

    failover_cmd()
        .args(["--once", "--log-format", "json", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"appliance\":\"Primary\""));
}
