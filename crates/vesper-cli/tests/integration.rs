//! Integration tests for the `vesper` binary.
//!
//! Only paths that never open an audio device are exercised here.

use std::process::Command;

/// Helper to get the path to the `vesper` binary built by cargo.
fn vesper_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_vesper"))
}

#[test]
fn cli_help_lists_subcommands() {
    let output = vesper_bin()
        .arg("--help")
        .output()
        .expect("failed to run vesper --help");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    for cmd in ["devices", "play", "noise"] {
        assert!(stdout.contains(cmd), "help should mention '{cmd}'");
    }
    for flag in ["--block-size", "--channels", "--sample-rate"] {
        assert!(stdout.contains(flag), "help should mention '{flag}'");
    }
}

#[test]
fn cli_version() {
    let output = vesper_bin().arg("--version").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "got: {stdout}");
}

#[test]
fn cli_requires_subcommand() {
    let output = vesper_bin().output().unwrap();
    assert!(!output.status.success());
}

#[test]
fn cli_rejects_non_numeric_block_size() {
    let output = vesper_bin()
        .args(["--block-size", "lots", "noise"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("block-size"), "got: {stderr}");
}

#[test]
fn cli_play_missing_manifest_fails_before_audio() {
    let output = vesper_bin()
        .args(["play", "/nonexistent/pack.toml"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("pack.toml"), "got: {stderr}");
}

#[test]
fn cli_play_invalid_manifest_reports_reason() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[engine]\nchannels = 0\n").unwrap();

    let output = vesper_bin().arg("play").arg(&path).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("channels"), "got: {stderr}");
}
