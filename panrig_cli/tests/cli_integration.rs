use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_config(dir: &tempfile::TempDir, toml: &str) -> PathBuf {
    let path = dir.path().join("panrig.toml");
    fs::write(&path, toml).unwrap();
    path
}

const VALID: &str = r#"
[scan]
default_period_ms = 200

[scheduler]
tick_ms = 2

[server]
bind = "127.0.0.1:0"
"#;

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["self-check"], 0, "ok", "stdout")]
#[case(&["health"], 0, "\"mode\":\"standby\"", "stdout")]
#[case(&["run", "--no-self-test", "--max-ticks", "20"], 0, "", "stdout")]
#[case(&["bogus"], 2, "unrecognized subcommand", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);

    let mut cmd = Command::cargo_bin("panrig").unwrap();
    cmd.arg("--config").arg(&cfg);
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    if stream == "stdout" {
        assert.stdout(predicate::str::contains(needle));
    } else {
        assert.stderr(predicate::str::contains(needle));
    }
}

#[test]
fn health_prints_one_json_status_line() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);
    let out = Command::cargo_bin("panrig")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("health")
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert_eq!(stdout.lines().count(), 1);
    let v: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(v["status"], "ok");
    assert_eq!(v["angle"], 90);
    assert_eq!(v["scan_speed"], 200);
    assert_eq!(v["commands"], 0);
    assert!(v["rssi"].is_null());
}

#[rstest]
#[case("[scan]\nmin_period_ms = 0\n", "min_period_ms")]
#[case("[scan]\nblink_ms = \"fast\"\n", "blink_ms")]
#[case("[logging]\nrotation = \"weekly\"\n", "rotation")]
fn invalid_config_exits_with_code_2(#[case] toml: &str, #[case] needle: &str) {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, toml);
    Command::cargo_bin("panrig")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("self-check")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid configuration"))
        .stderr(predicate::str::contains(needle));
}

#[test]
fn explicit_missing_config_is_an_error() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("panrig")
        .unwrap()
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("health")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("read config"));
}

#[test]
fn default_config_path_is_optional() {
    let dir = tempdir().unwrap();
    Command::cargo_bin("panrig")
        .unwrap()
        .current_dir(dir.path())
        .arg("self-check")
        .assert()
        .success()
        .stdout(predicate::str::contains("ok"));
}

#[test]
fn json_errors_are_structured() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, "[scheduler]\ntick_ms = 900\n");
    let out = Command::cargo_bin("panrig")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .arg("--json")
        .arg("health")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8(out.stderr).unwrap();
    let line = stderr.lines().last().unwrap();
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["reason"], "Config");
    assert!(v["message"].as_str().unwrap().contains("tick_ms"));
}

#[test]
fn bind_failure_halts_then_exits_non_zero() {
    let dir = tempdir().unwrap();
    let cfg = write_config(&dir, VALID);
    let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = taken.local_addr().unwrap().to_string();
    Command::cargo_bin("panrig")
        .unwrap()
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--bind", &addr, "--no-self-test", "--max-ticks", "1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("could not listen"));
}
