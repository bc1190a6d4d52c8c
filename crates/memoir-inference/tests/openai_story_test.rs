//! Story generation against a mocked OpenAI-compatible endpoint.

#![cfg(feature = "openai")]

use memoir_core::{AutobiographyRecord, Error, GenerationBackend, StoryGenerator, WritingStyle};
use memoir_inference::openai::{OpenAIBackend, OpenAIConfig};
use memoir_inference::LlmStoryGenerator;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> OpenAIConfig {
    OpenAIConfig {
        base_url: server.uri(),
        api_key: Some("test-key".to_string()),
        gen_model: "test-gen".to_string(),
        timeout_seconds: 10,
        ..Default::default()
    }
}

fn chat_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-123",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 50, "completion_tokens": 10, "total_tokens": 60}
    })
}

#[tokio::test]
async fn test_story_request_carries_auth_model_and_messages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({"model": "test-gen"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("I was born in London.")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = OpenAIBackend::new(config_for(&mock_server)).expect("Failed to create backend");
    let generator = LlmStoryGenerator::new(backend);

    let mut record = AutobiographyRecord::new_draft("u1");
    record.personal_info.name = "Ada".to_string();
    let story = generator
        .generate_story(&record, WritingStyle::Professional)
        .await
        .expect("generation should succeed");

    assert_eq!(story, "I was born in London.");

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["messages"][0]["role"], "system");
    assert!(body["messages"][0]["content"]
        .as_str()
        .unwrap()
        .contains("professional profile"));
    assert_eq!(body["messages"][1]["role"], "user");
    assert!(body["messages"][1]["content"]
        .as_str()
        .unwrap()
        .contains("- Name: Ada"));
}

#[tokio::test]
async fn test_openrouter_headers_sent_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("HTTP-Referer", "https://memoir.example"))
        .and(header("X-Title", "Memoir"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("ok")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = OpenAIConfig {
        http_referer: Some("https://memoir.example".to_string()),
        x_title: Some("Memoir".to_string()),
        ..config_for(&mock_server)
    };
    let backend = OpenAIBackend::new(config).unwrap();
    let result = backend.generate("hello").await;
    assert!(result.is_ok(), "Request should succeed: {:?}", result.err());
}

#[tokio::test]
async fn test_server_error_maps_to_inference_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
            "error": {"message": "overloaded", "type": "server_error"}
        })))
        .mount(&mock_server)
        .await;

    let generator = LlmStoryGenerator::new(OpenAIBackend::new(config_for(&mock_server)).unwrap());
    let err = generator
        .generate_story(&AutobiographyRecord::new_draft("u1"), WritingStyle::Simple)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Inference(_)));
    assert!(err.to_string().contains("overloaded"));
}

#[tokio::test]
async fn test_bad_credentials_map_to_config_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {"message": "Incorrect API key", "type": "invalid_request_error"}
        })))
        .mount(&mock_server)
        .await;

    let backend = OpenAIBackend::new(config_for(&mock_server)).unwrap();
    let err = backend.generate("hi").await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn test_empty_completion_is_rejected_by_story_generator() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-1",
            "choices": []
        })))
        .mount(&mock_server)
        .await;

    let generator = LlmStoryGenerator::new(OpenAIBackend::new(config_for(&mock_server)).unwrap());
    let result = generator
        .generate_story(&AutobiographyRecord::new_draft("u1"), WritingStyle::Emotional)
        .await;
    assert!(matches!(result, Err(Error::Inference(_))));
}
