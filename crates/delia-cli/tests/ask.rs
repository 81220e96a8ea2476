//! One-shot `ask` against a mock backend.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// DELIA_HOME with a stored token.
fn logged_in_home() -> TempDir {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("token"), "test-token\n").unwrap();
    home
}

#[tokio::test]
async fn test_ask_prints_sanitized_answer() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = logged_in_home();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({"question": "What is DELIA?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "<think>let me see</think>\n\nDELIA answers questions."
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("delia")
        .env("DELIA_HOME", home.path())
        .env("DELIA_API_URL", server.uri())
        .args(["ask", "-p", "What is DELIA?"])
        .assert()
        .success()
        .stdout("DELIA answers questions.\n");
}

#[tokio::test]
async fn test_ask_edsl_sends_level() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = logged_in_home();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/delia"))
        .and(body_json(json!({"question": "loops?", "user_level": "advanced"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Use FOR.",
            "has_edsl_code": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("delia")
        .env("DELIA_HOME", home.path())
        .env("DELIA_API_URL", server.uri())
        .args(["--agent", "edsl", "--level", "advanced", "ask"])
        .write_stdin("loops?\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Use FOR."));
}

#[tokio::test]
async fn test_expired_token_is_cleared() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = logged_in_home();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    cargo_bin_cmd!("delia")
        .env("DELIA_HOME", home.path())
        .env("DELIA_API_URL", server.uri())
        .args(["ask", "-p", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("delia login"));

    assert!(!home.path().join("token").exists());
}

#[test]
fn test_ask_requires_login() {
    let home = TempDir::new().unwrap();

    cargo_bin_cmd!("delia")
        .env("DELIA_HOME", home.path())
        .env("DELIA_API_URL", "http://127.0.0.1:9")
        .args(["ask", "-p", "hi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_ask_rejects_empty_question() {
    let home = TempDir::new().unwrap();

    cargo_bin_cmd!("delia")
        .env("DELIA_HOME", home.path())
        .arg("ask")
        .write_stdin("   \n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No question provided"));
}
