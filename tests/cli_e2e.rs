//! End-to-end smoke tests for the handover binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_cli_help_mentions_outputs() {
    Command::cargo_bin("handover")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("aria2"));
}

#[test]
fn test_cli_fails_on_missing_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let task = write_file(&dir, "task.json", r#"{"accepted": []}"#);
    Command::cargo_bin("handover")
        .unwrap()
        .args(["-c", "/nonexistent/config.json", "-t"])
        .arg(&task)
        .assert()
        .failure()
        .stderr(predicate::str::contains("config"));
}

#[test]
fn test_cli_fails_when_no_output_is_configured() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(&dir, "config.json", "{}");
    let task = write_file(&dir, "task.json", r#"{"accepted": []}"#);
    Command::cargo_bin("handover")
        .unwrap()
        .arg("-c")
        .arg(&config)
        .arg("-t")
        .arg(&task)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no outputs"));
}

#[test]
fn test_cli_learn_mode_succeeds_without_any_daemon() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(
        &dir,
        "config.json",
        r#"{
            "aria2": {"server": "192.0.2.1", "port": 6800, "path": "~/downloads"},
            "cloudtorrent": {"server": "192.0.2.1"}
        }"#,
    );
    let task = write_file(
        &dir,
        "task.json",
        r#"{"accepted": [{"title": "one", "url": "magnet:?xt=urn:btih:aa"}]}"#,
    );
    Command::cargo_bin("handover")
        .unwrap()
        .arg("-c")
        .arg(&config)
        .arg("-t")
        .arg(&task)
        .arg("--learn")
        .assert()
        .success();
}

#[test]
fn test_cli_rejects_malformed_task_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(&dir, "config.json", r#"{"cloudtorrent": {}}"#);
    let task = write_file(&dir, "task.json", "not json");
    Command::cargo_bin("handover")
        .unwrap()
        .arg("-c")
        .arg(&config)
        .arg("-t")
        .arg(&task)
        .assert()
        .failure()
        .stderr(predicate::str::contains("task"));
}
