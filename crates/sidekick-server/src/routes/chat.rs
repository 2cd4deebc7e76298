use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    /// The widget's visible history, accepted for interface compatibility
    /// and ignored: the server-side thread is authoritative
    #[serde(default)]
    #[allow(dead_code)]
    pub history: Vec<Value>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// Append the user message to the thread, run the assistant, return the text
/// of the last message. Remote failures surface as 500; there is no retry.
async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, StatusCode> {
    let mut thread = state.thread.lock().await;

    let reply = state
        .assistant
        .chat(&mut thread, &request.message)
        .await
        .map_err(|err| {
            tracing::error!("chat run failed: {:?}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(ChatResponse { reply }))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde_json::json;
    use sidekick::assistant::Assistant;
    use sidekick::models::message::Message;
    use sidekick::models::tool::Tool;
    use sidekick::providers::base::{Provider, Usage};
    use std::sync::{Arc, Mutex};
    use tower::ServiceExt;

    /// Replays scripted responses; errors once the script runs out
    struct ScriptedProvider {
        responses: Arc<Mutex<Vec<Message>>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Message>) -> Self {
            Self {
                responses: Arc::new(Mutex::new(responses)),
            }
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        async fn complete(
            &self,
            _system: &str,
            _messages: &[Message],
            _tools: &[Tool],
        ) -> Result<(Message, Usage)> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                Err(anyhow!("no scripted response left"))
            } else {
                Ok((responses.remove(0), Usage::default()))
            }
        }
    }

    fn state_with(responses: Vec<Message>) -> AppState {
        let assistant = Assistant::new(
            Box::new(ScriptedProvider::new(responses)),
            "Bob",
            "You are a helpful AI assistant.",
        );
        AppState::new(assistant, Vec::new())
    }

    fn chat_request(message: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"message": message, "history": []}).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_chat_returns_the_reply() {
        let state = state_with(vec![Message::assistant().with_text("Hello!")]);
        let app = routes(state.clone());

        let response = app.oneshot(chat_request("Hi")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let parsed: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["reply"], "Hello!");

        // the run appended to the shared thread
        let thread = state.thread.lock().await;
        assert_eq!(thread.len(), 2);
        assert_eq!(thread.messages()[0].text(), "Hi");
    }

    #[tokio::test]
    async fn test_thread_grows_across_requests() {
        let state = state_with(vec![
            Message::assistant().with_text("one"),
            Message::assistant().with_text("two"),
        ]);

        for expected in ["one", "two"] {
            let app = routes(state.clone());
            let response = app.oneshot(chat_request("again")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);

            let body = response.into_body().collect().await.unwrap().to_bytes();
            let parsed: Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(parsed["reply"], expected);
        }

        let thread = state.thread.lock().await;
        assert_eq!(thread.len(), 4);
    }

    #[tokio::test]
    async fn test_provider_failure_is_a_500() {
        let state = state_with(Vec::new());
        let app = routes(state);

        let response = app.oneshot(chat_request("Hi")).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
