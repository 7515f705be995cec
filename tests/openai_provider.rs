//! HTTP-level tests for the chat-completion provider against a local mock server.

use mockito::Matcher;
use news_digest_bot::config::SYSTEM_PROMPT;
use news_digest_bot::llm::{AiResponder, LlmError, OpenAiProvider};
use serde_json::json;
use std::sync::Arc;

fn completion_body(content: serde_json::Value) -> String {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1_714_586_400,
        "model": "gpt-4",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 20, "completion_tokens": 8, "total_tokens": 28}
    })
    .to_string()
}

#[tokio::test]
async fn test_question_sent_verbatim_with_system_prompt() -> Result<(), LlmError> {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4",
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": "What happened in Berlin?"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(json!("In Berlin wurde gewählt.")))
        .expect(1)
        .create_async()
        .await;

    let provider = OpenAiProvider::new("sk-test".to_string(), server.url());
    let responder = AiResponder::new(Arc::new(provider), "gpt-4".to_string(), 10);

    let answer = responder
        .answer_question("What happened in Berlin?")
        .await?;

    mock.assert_async().await;
    assert_eq!(answer, "In Berlin wurde gewählt.");
    Ok(())
}

#[tokio::test]
async fn test_null_content_is_empty_response() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion_body(serde_json::Value::Null))
        .create_async()
        .await;

    let provider = OpenAiProvider::new("sk-test".to_string(), server.url());
    let responder = AiResponder::new(Arc::new(provider), "gpt-4".to_string(), 10);

    assert!(matches!(
        responder.answer_question("Hallo?").await,
        Err(LlmError::ApiError(_))
    ));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("upstream exploded")
        .expect(1)
        .create_async()
        .await;

    let provider = OpenAiProvider::new("sk-test".to_string(), server.url());
    let responder = AiResponder::new(Arc::new(provider), "gpt-4".to_string(), 10);

    match responder.answer_question("Hallo?").await {
        Err(LlmError::ApiError(msg)) => assert!(msg.contains("upstream exploded")),
        other => panic!("expected API error, got {other:?}"),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": {
                    "message": "Rate limit reached",
                    "type": "requests",
                    "param": null,
                    "code": "rate_limit_exceeded"
                }
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let provider = OpenAiProvider::new("sk-test".to_string(), server.url());
    let responder = AiResponder::new(Arc::new(provider), "gpt-4".to_string(), 10);

    assert!(matches!(
        responder.answer_question("Hallo?").await,
        Err(LlmError::ApiError(_))
    ));
    mock.assert_async().await;
}
