use delia_core::api::{Agent, ApiClient, ApiError, UserLevel};
use tokio_util::sync::CancellationToken;

use crate::events::UiEvent;
use crate::transcript::CellId;

/// Asks `agent` and reports the raw answer for `cell`.
///
/// When `cancel` fires first the request future is dropped. The reducer has
/// already forgotten the task by then, so the result is discarded.
pub async fn ask_agent(
    client: ApiClient,
    cell: CellId,
    agent: Agent,
    level: UserLevel,
    question: String,
    cancel: Option<CancellationToken>,
) -> UiEvent {
    let request = client.ask(agent, &question, level);
    let result = match cancel {
        Some(cancel) => tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!("chat request cancelled");
                Err(ApiError::Transport("request cancelled".to_string()))
            }
            result = request => result,
        },
        None => request.await,
    };
    UiEvent::ChatResult { cell, result }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_ask_documents_agent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(json!({"question": "hi"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "hello"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), "/chat/delia").with_token(Some("tok".into()));
        let cell = CellId::new();
        let event = ask_agent(
            client,
            cell,
            Agent::Documents,
            UserLevel::Basic,
            "hi".into(),
            None,
        )
        .await;

        assert!(matches!(
            event,
            UiEvent::ChatResult { cell: c, result: Ok(answer) } if c == cell && answer == "hello"
        ));
    }

    #[tokio::test]
    async fn test_cancel_wins_over_slow_backend() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"answer": "late"}))
                    .set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri(), "/chat/delia");
        let cancel = CancellationToken::new();
        cancel.cancel();
        let event = ask_agent(
            client,
            CellId::new(),
            Agent::Documents,
            UserLevel::Basic,
            "hi".into(),
            Some(cancel),
        )
        .await;

        assert!(matches!(event, UiEvent::ChatResult { result: Err(_), .. }));
    }
}
