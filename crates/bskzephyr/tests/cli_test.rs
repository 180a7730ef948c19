//! Integration tests for the `zephyr` CLI binary.
//!
//! Parsing, help output, completions and error exit codes run offline;
//! the device commands run against a local mock of the cloud API.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `zephyr` binary with env isolation.
///
/// Clears all `ZEPHYR_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn zephyr_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("zephyr");
    cmd.env("HOME", "/tmp/zephyr-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/zephyr-cli-test-nonexistent")
        .env_remove("ZEPHYR_PROFILE")
        .env_remove("ZEPHYR_USERNAME")
        .env_remove("ZEPHYR_PASSWORD")
        .env_remove("ZEPHYR_TOKEN")
        .env_remove("ZEPHYR_BASE_URL")
        .env_remove("ZEPHYR_OUTPUT")
        .env_remove("ZEPHYR_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn device_json(speed: u16) -> serde_json::Value {
    json!({
        "_id": "dev-oid",
        "deviceID": "ZX-0001",
        "groupID": "grp-1",
        "deviceModel": "Zephyr v2",
        "deviceStatus": "on",
        "fanMode": "cycle",
        "fanSpeed": speed,
        "humidityBoost": 60,
        "temperature": 21.5,
        "humidity": 48.0
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = zephyr_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    zephyr_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("BSK Zephyr")
            .and(predicate::str::contains("login"))
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    zephyr_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("zephyr"));
}

#[test]
fn test_control_help_lists_options() {
    zephyr_cmd()
        .args(["devices", "control", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--speed")
                .and(predicate::str::contains("--mode"))
                .and(predicate::str::contains("--humidity-boost")),
        );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    zephyr_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_invalid_shell() {
    zephyr_cmd()
        .args(["completions", "tcsh"])
        .assert()
        .failure()
        .code(2);
}

// ── Argument validation ─────────────────────────────────────────────

#[test]
fn test_invalid_speed_is_rejected() {
    let output = zephyr_cmd()
        .args(["devices", "control", "grp-1", "--speed", "turbo"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("turbo"), "Expected the bad value echoed:\n{text}");
}

#[test]
fn test_invalid_output_format() {
    zephyr_cmd()
        .args(["-o", "xml", "devices", "list"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_unknown_profile_is_usage_error() {
    let output = zephyr_cmd()
        .args(["--profile", "cabin", "devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("cabin"));
}

// ── Offline behavior ────────────────────────────────────────────────

#[test]
fn test_control_without_changes_is_a_noop() {
    // Port 9 is discard; reaching the network here would fail the command.
    zephyr_cmd()
        .args([
            "--token",
            "abc",
            "--base-url",
            "http://127.0.0.1:9",
            "devices",
            "control",
            "grp-1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Nothing to change"));
}

#[test]
fn test_list_without_credentials_exits_with_auth_code() {
    let output = zephyr_cmd()
        .args(["--base-url", "http://127.0.0.1:9", "devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("No credentials"));
}

/// Write `contents` as the config file under a fresh config home.
fn config_home(contents: &str) -> tempfile::TempDir {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("zephyr");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), contents).unwrap();
    home
}

#[test]
fn test_config_show_json_masks_password() {
    let home = config_home(
        r#"
[profiles.default]
username = "me@example.com"
password = "hunter2"
"#,
    );

    zephyr_cmd()
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .args(["-o", "json", "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("me@example.com")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn test_config_init_keeps_unreadable_file() {
    let broken = "[profiles.home\nusername = ";
    let home = config_home(broken);

    zephyr_cmd()
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .args(["config", "init"])
        .write_stdin("")
        .assert()
        .failure()
        .code(1);

    let after = std::fs::read_to_string(home.path().join("zephyr/config.toml")).unwrap();
    assert_eq!(after, broken);
}

#[test]
fn test_config_path_prints_location() {
    zephyr_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── Against a mock cloud ────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_list_renders_decoded_speed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/device-user"))
        .and(header("authorization", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "_id": "link-1",
            "title": "Living room",
            "device": device_json(55)
        }])))
        .expect(1)
        .mount(&server)
        .await;

    zephyr_cmd()
        .args(["--token", "abc", "--base-url", &server.uri(), "-o", "json", "devices", "list"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"fanSpeed\": \"medium\"")
                .and(predicate::str::contains("Living room")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_control_sends_raw_speed_code() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/device"))
        .and(query_param("groupID", "grp-1"))
        .and(header("authorization", "abc"))
        .and(body_json(json!({ "fanSpeed": 80, "deviceStatus": "on" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(device_json(80)))
        .expect(1)
        .mount(&server)
        .await;

    zephyr_cmd()
        .args([
            "--token",
            "abc",
            "--base-url",
            &server.uri(),
            "-o",
            "plain",
            "devices",
            "control",
            "grp-1",
            "--speed",
            "high",
            "--status",
            "on",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("grp-1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_token_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/device-user"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = zephyr_cmd()
        .args(["--token", "stale", "--base-url", &server.uri(), "devices", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
}
