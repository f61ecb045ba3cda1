//! Integration tests for the `crmdesk` CLI binary.
//!
//! Argument parsing, help output, and shell completions run without any
//! server. Session flows run against a wiremock CRM API with HOME and the
//! XDG directories pointed at a temp dir.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `crmdesk` binary with env isolation.
///
/// Clears all `CRMDESK_*` env vars and points config and data directories
/// at `home` so tests never touch the user's real configuration or session.
fn crmdesk_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("crmdesk");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("NO_COLOR", "1")
        .env_remove("CRMDESK_PROFILE")
        .env_remove("CRMDESK_API_URL")
        .env_remove("CRMDESK_OUTPUT")
        .env_remove("CRMDESK_INSECURE")
        .env_remove("CRMDESK_TIMEOUT")
        .env_remove("CRMDESK_PASSWORD")
        .env_remove("CRMDESK_NEW_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn api_url(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

fn user_json(id: i64, role: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Ana Souza",
        "email": "a@b.com",
        "phone": 11_987_654_321_u64,
        "roles_user": role,
        "create_date": "2024-01-01T12:00:00.000Z"
    })
}

fn client_json(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "phone": "(11) 4002-8922",
        "create_date": "2024-01-01",
        "user_id": 1
    })
}

async fn mount_login(server: &MockServer, role: &str) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "token": "t1", "user": user_json(1, role) })),
        )
        .mount(server)
        .await;
}

fn login(home: &Path, server: &MockServer) {
    crmdesk_cmd(home)
        .args(["--api-url", &api_url(server)])
        .args(["login", "--email", "a@b.com", "--password", "x"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Logged in as Ana Souza"));
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = crmdesk_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    crmdesk_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("users")
            .and(predicate::str::contains("clients"))
            .and(predicate::str::contains("payments"))
            .and(predicate::str::contains("login")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    crmdesk_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("crmdesk"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    crmdesk_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let home = TempDir::new().unwrap();
    crmdesk_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    let output = crmdesk_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_list_without_login_exits_auth() {
    let home = TempDir::new().unwrap();
    crmdesk_cmd(home.path())
        .args(["clients", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_invalid_enum_value_is_usage_error() {
    let home = TempDir::new().unwrap();
    crmdesk_cmd(home.path())
        .args(["payments", "create", "-c", "3", "--due", "2024-02-01", "--type", "pix"])
        .assert()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_points_into_config_home() {
    let home = TempDir::new().unwrap();
    crmdesk_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_use_unknown_profile() {
    let home = TempDir::new().unwrap();
    crmdesk_cmd(home.path())
        .args(["config", "use", "staging"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("staging"));
}

#[test]
fn test_unknown_profile_flag_is_reported() {
    let home = TempDir::new().unwrap();
    crmdesk_cmd(home.path())
        .args(["--profile", "staging", "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'staging' not found"));
}

// ── Session flows ───────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_login_persists_session_until_logout() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_login(&server, "ADMIN").await;
    Mock::given(method("GET"))
        .and(path("/api/client"))
        .and(header("Authorization", "Bearer t1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([
                client_json(1, "Padaria Sol"),
                client_json(2, "Oficina Lua"),
            ])),
        )
        .mount(&server)
        .await;

    login(home.path(), &server);

    crmdesk_cmd(home.path())
        .args(["-o", "json", "whoami"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"roles_user\": \"ADMIN\""));

    crmdesk_cmd(home.path())
        .args(["--api-url", &api_url(&server)])
        .args(["-o", "plain", "clients", "list", "--search", "padaria"])
        .assert()
        .success()
        .stdout("1\n");

    crmdesk_cmd(home.path())
        .arg("logout")
        .assert()
        .success()
        .stderr(predicate::str::contains("Logged out"));

    crmdesk_cmd(home.path())
        .args(["--api-url", &api_url(&server)])
        .args(["clients", "list"])
        .assert()
        .code(3);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_login_exits_auth() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .mount(&server)
        .await;

    crmdesk_cmd(home.path())
        .args(["--api-url", &api_url(&server)])
        .args(["login", "--email", "a@b.com", "--password", "wrong"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid credentials"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_needs_yes_when_not_interactive() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_login(&server, "ADMIN").await;
    Mock::given(method("GET"))
        .and(path("/api/client"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([client_json(2, "Oficina Lua")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/client/2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    login(home.path(), &server);

    crmdesk_cmd(home.path())
        .args(["--api-url", &api_url(&server)])
        .args(["clients", "delete", "2"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));

    crmdesk_cmd(home.path())
        .args(["--api-url", &api_url(&server)])
        .args(["-y", "clients", "delete", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Client 2 deleted."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_self_delete_is_refused() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_login(&server, "ADMIN").await;
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([user_json(1, "ADMIN")])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    login(home.path(), &server);

    crmdesk_cmd(home.path())
        .args(["--api-url", &api_url(&server)])
        .args(["-y", "users", "delete", "1"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("own account"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_non_admin_cannot_list_users() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_login(&server, "USER").await;
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    login(home.path(), &server);

    crmdesk_cmd(home.path())
        .args(["--api-url", &api_url(&server)])
        .args(["users", "list"])
        .assert()
        .code(5);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_api_exits_connection() {
    let home = TempDir::new().unwrap();
    crmdesk_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:1/api"])
        .args(["login", "--email", "a@b.com", "--password", "x"])
        .assert()
        .code(7);
}
