use anyhow::Result;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sidekick::assistant::Assistant;
use sidekick::models::role::Role;
use sidekick::providers::configs::OpenAiProviderConfig;
use sidekick::providers::openai::OpenAiProvider;
use sidekick::search::DdgClient;
use sidekick::thread::Thread;
use sidekick::toolkits::web::WebToolkit;

const RESULTS_PAGE: &str = r##"
    <div class="result">
        <a class="result__a" href="https://blog.rust-lang.org/">Rust Blog</a>
        <a class="result__snippet" href="#">Announcing a new release.</a>
    </div>
"##;

fn completion(body: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": body,
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 1, "completion_tokens": 1, "total_tokens": 2}
    }))
}

/// End to end: the model asks for a search, the toolkit runs it against the
/// search provider, and the model's final text comes back as the reply.
#[tokio::test]
async fn test_chat_with_tool_round_trip() -> Result<()> {
    let llm = MockServer::start().await;
    let ddg = MockServer::start().await;

    // First completion requests the search tool, second one answers
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {
                    "name": "search",
                    "arguments": "{\"keywords\": \"rust news\", \"max_results\": 1}"
                }
            }]
        })))
        .up_to_n_times(1)
        .mount(&llm)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(completion(json!({
            "role": "assistant",
            "content": "Here is what I found."
        })))
        .mount(&llm)
        .await;

    Mock::given(method("GET"))
        .and(path("/html/"))
        .and(query_param("q", "rust news"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
        .expect(1)
        .mount(&ddg)
        .await;

    let provider = OpenAiProvider::new(OpenAiProviderConfig {
        host: llm.uri(),
        api_key: "test-key".to_string(),
        model: "gpt-4o".to_string(),
        temperature: None,
        max_tokens: None,
    })?;

    let mut assistant = Assistant::new(
        Box::new(provider),
        "Bob",
        "You are a helpful AI assistant.",
    );
    assistant.add_toolkit(Box::new(WebToolkit::new(DdgClient::with_host(&ddg.uri()))?));

    let mut thread = Thread::new();
    let reply = assistant.chat(&mut thread, "What's new in Rust?").await?;

    assert_eq!(reply, "Here is what I found.");

    // user, tool request, tool response, final answer
    assert_eq!(thread.len(), 4);
    assert_eq!(thread.messages()[0].role, Role::User);
    assert_eq!(thread.messages()[0].text(), "What's new in Rust?");

    let response = thread.messages()[2].content[0].as_tool_response().unwrap();
    assert_eq!(response.id, "call_1");
    let output = response.output.as_ref().unwrap();
    assert_eq!(output[0]["title"], "Rust Blog");
    assert_eq!(output[0]["href"], "https://blog.rust-lang.org/");

    // the second completion request carried the tool result and the tool set
    let requests = llm.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    let second: Value = serde_json::from_slice(&requests[1].body)?;
    let messages = second["messages"].as_array().unwrap();
    let tool_message = messages
        .iter()
        .find(|m| m["role"] == "tool")
        .expect("tool response forwarded to the model");
    assert_eq!(tool_message["tool_call_id"], "call_1");
    assert!(tool_message["content"].as_str().unwrap().contains("Rust Blog"));
    assert_eq!(second["tools"].as_array().unwrap().len(), 5);

    Ok(())
}
