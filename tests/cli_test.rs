mod helpers;

use std::path::Path;
use std::process::{Command, Output};

/// Run the binary with its log directory inside `state_dir`.
fn run_binary(state_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ferrum"))
        .args(args)
        .env("XDG_STATE_HOME", state_dir)
        .output()
        .expect("Failed to execute binary")
}

#[test]
fn test_not_a_repo_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().to_string_lossy().into_owned();
    let output = run_binary(tmp.path(), &[&path]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success(), "Should fail outside a git repo");
    assert!(
        stderr.contains("git repository"),
        "Error should mention the repository, got: {stderr}"
    );
}

#[test]
fn test_invalid_glob_rejected_before_tui() {
    let (dir, _repo) = helpers::create_temp_repo();
    let path = dir.path().to_string_lossy().into_owned();
    let output = run_binary(dir.path(), &[&path, "--files", "[unclosed"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(
        stderr.contains("Invalid glob pattern"),
        "Should report the glob, got: {stderr}"
    );
}

#[test]
fn test_invalid_theme_is_parse_error() {
    let tmp = tempfile::TempDir::new().unwrap();
    let output = run_binary(tmp.path(), &["--theme", "neon"]);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(
        stderr.contains("invalid value"),
        "Should be an argument error, got: {stderr}"
    );
}

#[test]
fn test_help_lists_options() {
    let tmp = tempfile::TempDir::new().unwrap();
    let output = run_binary(tmp.path(), &["--help"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    for flag in ["--files", "--theme", "--fetch-interval", "--commits", "--debug"] {
        assert!(stdout.contains(flag), "help should list {flag}, got: {stdout}");
    }
}

#[test]
fn test_log_file_created() {
    let tmp = tempfile::TempDir::new().unwrap();
    let not_repo = tempfile::TempDir::new().unwrap();
    let path = not_repo.path().to_string_lossy().into_owned();
    run_binary(tmp.path(), &[&path, "--debug"]);

    let log = std::fs::read_to_string(tmp.path().join("ferrum").join("ferrum.log")).unwrap();
    assert!(log.contains("Logging initialized"));
}
