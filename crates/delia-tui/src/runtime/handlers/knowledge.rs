use std::path::PathBuf;

use delia_core::api::ApiClient;

use crate::events::UiEvent;

pub async fn load_stats(client: ApiClient) -> UiEvent {
    UiEvent::StatsLoaded(client.document_stats().await)
}

pub async fn list_documents(client: ApiClient) -> UiEvent {
    UiEvent::DocumentsListed(client.list_documents().await)
}

pub async fn upload_document(client: ApiClient, path: PathBuf) -> UiEvent {
    UiEvent::UploadResult {
        file: display_name(&path),
        result: client.upload_document(&path).await,
    }
}

pub async fn clear_database(client: ApiClient) -> UiEvent {
    UiEvent::DatabaseCleared(client.clear_database().await)
}

/// File name shown while and after uploading.
pub fn display_name(path: &std::path::Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use delia_core::api::ApiError;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Path::new("/tmp/docs/guide.pdf")), "guide.pdf");
        assert_eq!(display_name(Path::new("/")), "/");
    }

    #[tokio::test]
    async fn test_upload_reports_file_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hello").unwrap();

        let client = ApiClient::new(server.uri(), "/chat/delia");
        let event = upload_document(client, file).await;
        assert!(matches!(
            event,
            UiEvent::UploadResult { ref file, result: Ok(()) } if file == "notes.txt"
        ));
    }

    #[tokio::test]
    async fn test_stats_failure_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents/database/stats"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), "/chat/delia");
        let event = load_stats(client).await;
        assert!(matches!(
            event,
            UiEvent::StatsLoaded(Err(ApiError::Status { status: 500, .. }))
        ));
    }
}
