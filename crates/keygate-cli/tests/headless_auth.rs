use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(home: &Path, contents: &str) {
    fs::write(home.join("config.toml"), contents).unwrap();
}

fn memory_config(home: &Path) {
    write_config(
        home,
        r#"
provider = "memory"

[memory]
latency_ms = 0

[memory.accounts]
"known@example.com" = "secret1"
"#,
    );
}

#[test]
fn test_register_with_memory_provider() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("keygate")
        .env("KEYGATE_HOME", dir.path())
        .args([
            "--provider",
            "memory",
            "register",
            "--email",
            "new@example.com",
            "--password",
            "secret1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered new@example.com"));
}

#[test]
fn test_login_with_seeded_account() {
    let dir = tempdir().unwrap();
    memory_config(dir.path());

    cargo_bin_cmd!("keygate")
        .env("KEYGATE_HOME", dir.path())
        .args(["login", "--email", "known@example.com"])
        .env("KEYGATE_PASSWORD", "secret1")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as known@example.com"));
}

#[test]
fn test_login_unknown_account_fails() {
    let dir = tempdir().unwrap();
    memory_config(dir.path());

    cargo_bin_cmd!("keygate")
        .env("KEYGATE_HOME", dir.path())
        .args([
            "login",
            "--email",
            "nobody@example.com",
            "--password",
            "secret1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid email or password"));
}

#[test]
fn test_register_existing_account_fails() {
    let dir = tempdir().unwrap();
    memory_config(dir.path());

    cargo_bin_cmd!("keygate")
        .env("KEYGATE_HOME", dir.path())
        .args([
            "register",
            "--email",
            "known@example.com",
            "--password",
            "secret1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Email already in use"));
}

#[test]
fn test_invalid_email_is_rejected_before_submit() {
    let dir = tempdir().unwrap();
    memory_config(dir.path());

    cargo_bin_cmd!("keygate")
        .env("KEYGATE_HOME", dir.path())
        .args(["login", "--email", "invalid", "--password", "secret1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid email"));
}

#[test]
fn test_short_password_is_rejected_before_submit() {
    let dir = tempdir().unwrap();
    memory_config(dir.path());

    cargo_bin_cmd!("keygate")
        .env("KEYGATE_HOME", dir.path())
        .args(["register", "--email", "a@example.com", "--password", "123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Password must be at least 6 characters",
        ));
}

#[test]
fn test_firebase_without_api_key_fails() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("keygate")
        .env("KEYGATE_HOME", dir.path())
        .env_remove("KEYGATE_FIREBASE_API_KEY")
        .args([
            "login",
            "--email",
            "a@example.com",
            "--password",
            "secret1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEYGATE_FIREBASE_API_KEY"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_firebase_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": { "code": 400, "message": "INVALID_LOGIN_CREDENTIALS" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempdir().unwrap();
    write_config(
        dir.path(),
        &format!(
            "provider = \"firebase\"\n\n[firebase]\napi_key = \"test-key\"\nbase_url = \"{}/v1\"\n",
            server.uri()
        ),
    );

    cargo_bin_cmd!("keygate")
        .env("KEYGATE_HOME", dir.path())
        .env_remove("KEYGATE_FIREBASE_API_KEY")
        .args([
            "login",
            "--email",
            "a@example.com",
            "--password",
            "secret1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "The email or password is incorrect.",
        ));
}
