use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn logged_in_home() -> TempDir {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("token"), "test-token").unwrap();
    home
}

#[tokio::test]
async fn test_docs_stats_prints_counts() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = logged_in_home();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/database/stats"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_documents": 3,
            "total_chunks": 42
        })))
        .mount(&server)
        .await;

    cargo_bin_cmd!("delia")
        .env("DELIA_HOME", home.path())
        .env("DELIA_API_URL", server.uri())
        .args(["docs", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3 documents, 42 chunks"));
}

#[tokio::test]
async fn test_docs_list_prints_rows() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = logged_in_home();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/documents/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "1", "filename": "guide.pdf", "upload_date": "2024-05-01", "file_size": 2048}
        ])))
        .mount(&server)
        .await;

    cargo_bin_cmd!("delia")
        .env("DELIA_HOME", home.path())
        .env("DELIA_API_URL", server.uri())
        .args(["docs", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("guide.pdf"))
        .stdout(predicate::str::contains("2.0 KB"));
}

#[test]
fn test_upload_rejects_unknown_extension() {
    let home = logged_in_home();
    let file = home.path().join("notes.docx");
    fs::write(&file, "x").unwrap();

    cargo_bin_cmd!("delia")
        .env("DELIA_HOME", home.path())
        .env("DELIA_API_URL", "http://127.0.0.1:9")
        .args(["docs", "upload"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file"));
}

#[test]
fn test_clear_requires_confirmation() {
    let home = logged_in_home();

    cargo_bin_cmd!("delia")
        .env("DELIA_HOME", home.path())
        .args(["docs", "clear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
}
