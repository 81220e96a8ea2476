//! HTTP client for the DELIA backend.
//!
//! Every call except [`ApiClient::login`] carries `Authorization: Bearer`
//! when a token is set. Callers react to [`ApiError::Unauthorized`] by clearing
//! the stored token.

mod errors;
mod types;

use std::path::Path;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;

pub use errors::ApiError;
pub use types::{
    Agent, ChatRequest, ChatResponse, Document, DocumentStats, EdslChatRequest, EdslChatResponse,
    TokenResponse, UserLevel,
};

use crate::config::Config;

const LOGIN_PATH: &str = "/auth/token";
const CHAT_PATH: &str = "/chat";
const STATS_PATH: &str = "/documents/database/stats";
const LIST_PATH: &str = "/documents/list";
const UPLOAD_PATH: &str = "/documents/upload";
const CLEAR_PATH: &str = "/documents/database/clear";

/// File extensions the backend can index.
pub const UPLOAD_EXTENSIONS: [&str; 4] = ["pdf", "txt", "json", "xlsx"];

/// Returns true if `path` has an extension the backend accepts for upload.
pub fn is_supported_upload(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            UPLOAD_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Backend API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    edsl_chat_path: String,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client for `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, edsl_chat_path: &str) -> Self {
        Self::with_http(reqwest::Client::new(), base_url, edsl_chat_path)
    }

    /// Creates a client from config, honoring `DELIA_API_URL` and the request timeout.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(Self::with_http(
            http,
            config.effective_api_url()?,
            &config.edsl_chat_path,
        ))
    }

    fn with_http(http: reqwest::Client, base_url: impl Into<String>, edsl_chat_path: &str) -> Self {
        let edsl_chat_path = if edsl_chat_path.starts_with('/') {
            edsl_chat_path.to_string()
        } else {
            format!("/{edsl_chat_path}")
        };
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            edsl_chat_path,
            token: None,
        }
    }

    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = builder.send().await.map_err(|e| ApiError::transport(&e))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "backend request failed");
            return Err(ApiError::status(status.as_u16(), &body));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Exchanges credentials for an access token (form-encoded, no bearer header).
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        tracing::info!(username, "logging in");
        let builder = self
            .http
            .post(self.url(LOGIN_PATH))
            .form(&[("username", username), ("password", password)]);
        self.send_json(builder).await
    }

    /// Asks the documents agent. Returns the raw answer.
    pub async fn chat(&self, question: &str) -> Result<String, ApiError> {
        let builder = self
            .authorized(self.http.post(self.url(CHAT_PATH)))
            .json(&ChatRequest { question });
        let response: ChatResponse = self.send_json(builder).await?;
        Ok(response.answer)
    }

    /// Asks the EDSL agent at the given knowledge level.
    pub async fn chat_edsl(
        &self,
        question: &str,
        user_level: UserLevel,
    ) -> Result<EdslChatResponse, ApiError> {
        let builder = self
            .authorized(self.http.post(self.url(&self.edsl_chat_path)))
            .json(&EdslChatRequest {
                question,
                user_level,
            });
        self.send_json(builder).await
    }

    /// Asks whichever agent is selected. Returns the raw answer text.
    pub async fn ask(
        &self,
        agent: Agent,
        question: &str,
        user_level: UserLevel,
    ) -> Result<String, ApiError> {
        match agent {
            Agent::Documents => self.chat(question).await,
            Agent::Edsl => {
                let response = self.chat_edsl(question, user_level).await?;
                if let Some(error) = &response.error {
                    tracing::warn!(%error, "EDSL agent reported an error");
                }
                Ok(response.response)
            }
        }
    }

    pub async fn document_stats(&self) -> Result<DocumentStats, ApiError> {
        let builder = self.authorized(self.http.get(self.url(STATS_PATH)));
        self.send_json(builder).await
    }

    pub async fn list_documents(&self) -> Result<Vec<Document>, ApiError> {
        let builder = self.authorized(self.http.get(self.url(LIST_PATH)));
        self.send_json(builder).await
    }

    /// Uploads a document as multipart field `file`.
    ///
    /// The extension is checked before the file is read or any request is made.
    pub async fn upload_document(&self, path: &Path) -> Result<(), ApiError> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        if !is_supported_upload(path) {
            return Err(ApiError::UnsupportedFile(file_name));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::Io(format!("Failed to read {}: {e}", path.display())))?;
        tracing::info!(file = %file_name, size = bytes.len(), "uploading document");

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let builder = self
            .authorized(self.http.post(self.url(UPLOAD_PATH)))
            .multipart(form);
        self.send(builder).await?;
        Ok(())
    }

    /// Deletes every indexed document.
    pub async fn clear_database(&self) -> Result<(), ApiError> {
        tracing::info!("clearing document database");
        let builder = self.authorized(self.http.delete(self.url(CLEAR_PATH)));
        self.send(builder).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(server.uri(), "/chat/delia").with_token(Some("tok-1".to_string()))
    }

    #[test]
    fn test_supported_uploads() {
        assert!(is_supported_upload(Path::new("a/report.PDF")));
        assert!(is_supported_upload(Path::new("notes.txt")));
        assert!(is_supported_upload(Path::new("sheet.xlsx")));
        assert!(!is_supported_upload(Path::new("image.png")));
        assert!(!is_supported_upload(Path::new("README")));
    }

    #[test]
    fn test_edsl_path_is_normalized() {
        let client = ApiClient::new("http://host/api/v1/", "chat/delia");
        assert_eq!(client.base_url(), "http://host/api/v1");
        assert_eq!(client.url(&client.edsl_chat_path), "http://host/api/v1/chat/delia");
    }

    #[tokio::test]
    async fn test_chat_sends_bearer_and_question() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("authorization", "Bearer tok-1"))
            .and(body_json(json!({"question": "What is RAG?"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "Retrieval."})))
            .expect(1)
            .mount(&server)
            .await;

        let answer = client(&server).chat("What is RAG?").await.unwrap();
        assert_eq!(answer, "Retrieval.");
    }

    #[tokio::test]
    async fn test_edsl_chat_carries_user_level() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/delia"))
            .and(body_json(json!({"question": "loops?", "user_level": "advanced"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "Use `for`.",
                "validation_results": [],
                "user_level": "advanced",
                "has_edsl_code": false,
                "edsl_code_blocks_count": 0,
                "error": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let answer = client(&server)
            .ask(Agent::Edsl, "loops?", UserLevel::Advanced)
            .await
            .unwrap();
        assert_eq!(answer, "Use `for`.");
    }

    #[tokio::test]
    async fn test_401_maps_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents/database/stats"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "expired"})))
            .mount(&server)
            .await;

        let err = client(&server).document_stats().await.unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
    }

    #[tokio::test]
    async fn test_server_error_keeps_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents/list"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client(&server).list_documents().await.unwrap_err();
        assert_eq!(
            err,
            ApiError::Status {
                status: 500,
                body: "boom".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_login_posts_form_without_bearer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .and(body_string_contains("username=alice"))
            .and(body_string_contains("password=s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "new-token",
                "token_type": "bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = ApiClient::new(server.uri(), "/chat/delia")
            .login("alice", "s3cret")
            .await
            .unwrap();
        assert_eq!(token.access_token, "new-token");
        assert_eq!(token.token_type, "bearer");
    }

    #[tokio::test]
    async fn test_stats_and_list_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/documents/database/stats"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"total_documents": 2, "total_chunks": 17})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/documents/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": "d1",
                "filename": "manual.pdf",
                "upload_date": "2024-05-01T10:00:00",
                "file_size": 2048
            }])))
            .mount(&server)
            .await;

        let client = client(&server);
        let stats = client.document_stats().await.unwrap();
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.total_chunks, 17);

        let docs = client.list_documents().await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "manual.pdf");
    }

    #[tokio::test]
    async fn test_upload_rejects_unknown_extension_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents/upload"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server)
            .upload_document(&PathBuf::from("/nonexistent/photo.png"))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::UnsupportedFile("photo.png".to_string()));
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_file() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/documents/upload"))
            .and(header("authorization", "Bearer tok-1"))
            .and(body_string_contains("name=\"file\""))
            .and(body_string_contains("filename=\"notes.txt\""))
            .and(body_string_contains("hello index"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("notes.txt");
        std::fs::write(&file, "hello index").unwrap();

        client(&server).upload_document(&file).await.unwrap();
    }

    #[tokio::test]
    async fn test_clear_database_uses_delete() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/documents/database/clear"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).clear_database().await.unwrap();
    }
}
