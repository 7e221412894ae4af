//! Wire contract of the chat-completion summariser.

use serde_json::json;
use websearch::{Summarize, SummarizeError, Summarizer, SummarizerConfig};
use wiremock::matchers::{body_partial_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn summarizer(server: &MockServer, api_key: &str) -> Summarizer {
    let config = SummarizerConfig::new(format!("{}/v1", server.uri()), "test-model")
        .with_api_key(api_key);
    Summarizer::new(config).expect("summarizer")
}

#[tokio::test]
async fn request_carries_model_budget_and_attribution() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(header("http-referer", "https://github.com/benoute/websearch-mcp"))
        .and(header("x-title", "websearch-mcp"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "max_tokens": 250,
            "messages": [
                { "role": "system" },
                { "role": "user" }
            ]
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(completion("  Ownership moves values.  ")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let summary = summarizer(&server, "sk-test")
        .summarize("page body", "rust ownership", "https://doc.rust-lang.org", 200)
        .await
        .expect("summary");
    assert_eq!(summary, "Ownership moves values.");
}

#[tokio::test]
async fn user_message_contains_query_source_and_content() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(|req: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap_or_default();
            let user = body["messages"][1]["content"].as_str().unwrap_or_default().to_owned();
            let system = body["messages"][0]["content"].as_str().unwrap_or_default().to_owned();
            let ok = user.contains("Search query: borrow checker")
                && user.contains("Source URL: https://example.com/a")
                && user.contains("lifetimes are regions")
                && system.contains("under 64 tokens");
            if ok {
                ResponseTemplate::new(200).set_body_json(completion("matched"))
            } else {
                ResponseTemplate::new(400)
            }
        })
        .mount(&server)
        .await;

    let summary = summarizer(&server, "")
        .summarize("lifetimes are regions", "borrow checker", "https://example.com/a", 64)
        .await
        .expect("summary");
    assert_eq!(summary, "matched");
}

#[tokio::test]
async fn no_authorization_header_without_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("local model")))
        .mount(&server)
        .await;

    let summary = summarizer(&server, "")
        .summarize("text", "q", "https://example.com", 100)
        .await
        .expect("summary");
    assert_eq!(summary, "local model");
}

#[tokio::test]
async fn empty_choices_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let err = summarizer(&server, "k")
        .summarize("text", "q", "https://example.com", 100)
        .await
        .unwrap_err();
    assert!(matches!(err, SummarizeError::Completion(_)));
    assert!(err.to_string().contains("no response choices"));
}

#[tokio::test]
async fn blank_completion_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   \n")))
        .mount(&server)
        .await;

    let err = summarizer(&server, "k")
        .summarize("text", "q", "https://example.com", 100)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("empty completion"));
}

#[tokio::test]
async fn server_error_surfaces_status_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "model overloaded", "type": "server_error" }
        })))
        .mount(&server)
        .await;

    let err = summarizer(&server, "sk-secret")
        .summarize("text", "q", "https://example.com", 100)
        .await
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("HTTP 500"));
    assert!(message.contains("model overloaded"));
    assert!(!message.contains("sk-secret"));
}
