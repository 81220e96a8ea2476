use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

#[tokio::test]
async fn test_login_writes_token_file() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .and(body_string_contains("username=ana"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("delia")
        .env("DELIA_HOME", home.path())
        .env("DELIA_API_URL", server.uri())
        .args(["login", "--username", "ana", "--password", "secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in as ana."));

    let token = fs::read_to_string(home.path().join("token")).unwrap();
    assert_eq!(token.trim(), "fresh-token");
}

#[tokio::test]
async fn test_login_reads_credentials_from_stdin() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    cargo_bin_cmd!("delia")
        .env("DELIA_HOME", home.path())
        .env("DELIA_API_URL", server.uri())
        .env_remove("DELIA_USERNAME")
        .env_remove("DELIA_PASSWORD")
        .arg("login")
        .write_stdin("ana\nwrong\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("incorrect username or password"));

    assert!(!home.path().join("token").exists());
}

#[test]
fn test_logout_removes_token() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("token"), "old").unwrap();

    cargo_bin_cmd!("delia")
        .env("DELIA_HOME", home.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));

    assert!(!home.path().join("token").exists());
}
