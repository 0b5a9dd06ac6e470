// tests/ai_api.rs
// Generation and assistant routes against the mock path and a stub provider

mod common;

use axum::http::StatusCode;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{create_novel, get, post, test_app, test_app_with, test_config};
use storyloom::config::CacheBackend;

#[tokio::test]
async fn test_unreachable_provider_is_mocked_in_debug() {
    let app = test_app().await;
    let novel = create_novel(&app, "Ashfall").await;

    let (status, body) = post(
        &app,
        "/api/ai/generate",
        json!({ "novel_id": novel, "prompt": "Write the opening scene", "provider": "custom" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["model"], "gpt-4");
    assert_eq!(body["tokens_used"], 0);
    let content = body["content"].as_str().unwrap();
    assert!(content.starts_with("[mock:custom/gpt-4]"));
    assert!(content.contains("Write the opening scene"));
}

#[tokio::test]
async fn test_missing_key_fails_outside_debug() {
    let mut config = test_config();
    config.server.debug = false;
    let app = test_app_with(config).await;
    let novel = create_novel(&app, "Ashfall").await;

    let (status, body) = post(
        &app,
        "/api/ai/generate",
        json!({ "novel_id": novel, "prompt": "Write", "provider": "openai" }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_code"], "PROVIDER_ERROR");
    assert!(body["detail"].as_str().unwrap().contains("OPENAI_API_KEY"));
}

#[tokio::test]
async fn test_generation_for_unknown_novel() {
    let app = test_app().await;
    let (status, _) = post(
        &app,
        "/api/ai/generate",
        json!({ "novel_id": "missing", "prompt": "Write" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_identical_requests_hit_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "The ash fell like snow." } }],
            "usage": { "prompt_tokens": 40, "completion_tokens": 7 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.llm.cache.backend = CacheBackend::Memory;
    let app = test_app_with(config).await;
    let novel = create_novel(&app, "Ashfall").await;

    let payload = json!({
        "novel_id": novel,
        "prompt": "Write the opening scene",
        "provider": "local-llm",
        "model_name": "mistral",
        "base_url": server.uri(),
    });
    for _ in 0..2 {
        let (status, body) = post(&app, "/api/ai/generate", payload.clone()).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["content"], "The ash fell like snow.");
        assert_eq!(body["tokens_used"], 47);
        assert_eq!(body["model"], "mistral");
    }
}

#[tokio::test]
async fn test_openai_request_and_persona_token_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test-7f3a9c"))
        .and(body_partial_json(json!({ "model": "gpt-4o", "max_tokens": 800 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "Ilse reaches the ridge." } }],
            "usage": { "prompt_tokens": 50, "completion_tokens": 5, "total_tokens": 55 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = test_app().await;
    let novel = create_novel(&app, "Ashfall").await;
    // No max_tokens: the extractor persona's own budget is sent
    let (status, body) = post(
        &app,
        "/api/ai-assistants/generate",
        json!({
            "role": "extractor",
            "novel_id": novel,
            "user_input": "Summarize chapter one",
            "provider": "openai",
            "model_name": "gpt-4o",
            "api_key": "sk-test-7f3a9c",
            "base_url": server.uri(),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["content"], "Ilse reaches the ridge.");
    assert_eq!(body["tokens_used"], 55);
}

#[tokio::test]
async fn test_anthropic_request_shape_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test-41b2"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({ "model": "claude-3-haiku", "max_tokens": 600 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_01",
            "type": "message",
            "content": [{ "type": "text", "text": "Snow over the ruined keep." }],
            "usage": { "input_tokens": 30, "output_tokens": 12 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = test_app().await;
    let novel = create_novel(&app, "Ashfall").await;
    let (status, body) = post(
        &app,
        "/api/ai/generate",
        json!({
            "novel_id": novel,
            "prompt": "Describe the keep",
            "max_tokens": 600,
            "provider": "anthropic",
            "model_name": "claude-3-haiku",
            "api_key": "sk-ant-test-41b2",
            "base_url": server.uri(),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["content"], "Snow over the ruined keep.");
    assert_eq!(body["tokens_used"], 42);
    assert_eq!(body["model"], "claude-3-haiku");
}

#[tokio::test]
async fn test_ollama_request_shape_and_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama3",
            "stream": false,
            "options": { "num_predict": 300 },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama3",
            "response": "The river froze overnight.",
            "done": true,
            "prompt_eval_count": 25,
            "eval_count": 40,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = test_app().await;
    let novel = create_novel(&app, "Ashfall").await;
    let (status, body) = post(
        &app,
        "/api/ai/generate",
        json!({
            "novel_id": novel,
            "prompt": "Open with winter",
            "max_tokens": 300,
            "provider": "ollama",
            "model_name": "llama3",
            "base_url": server.uri(),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["content"], "The river froze overnight.");
    assert_eq!(body["tokens_used"], 65);
    assert_eq!(body["model"], "llama3");
}

#[tokio::test]
async fn test_custom_provider_falls_back_to_completion_style() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": "" } }],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "text": "A lone rider crested the ridge." }],
            "usage": { "total_tokens": 21 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = test_app().await;
    let novel = create_novel(&app, "Ashfall").await;
    let (status, body) = post(
        &app,
        "/api/ai/generate-world",
        json!({ "novel_id": novel, "provider": "custom", "base_url": server.uri(), "focus": "rules" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["content"], "A lone rider crested the ridge.");
    assert_eq!(body["tokens_used"], 21);
}

#[tokio::test]
async fn test_provider_http_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let app = test_app().await;
    let (status, body) = post(
        &app,
        "/api/ai/test-config",
        json!({ "provider": "custom", "base_url": server.uri() }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    assert!(body["message"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_config_check_reports_blank_provider_in_body() {
    let app = test_app().await;
    let (status, body) = post(&app, "/api/ai/test-config", json!({ "provider": "  " })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], false);
    assert_eq!(body["message"], "provider must not be empty");
}

#[tokio::test]
async fn test_assistant_catalogue_and_unknown_role() {
    let app = test_app().await;
    let (status, assistants) = get(&app, "/api/ai-assistants").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assistants.as_array().unwrap().len(), 6);

    let novel = create_novel(&app, "Ashfall").await;
    let (status, body) = post(
        &app,
        "/api/ai-assistants/generate",
        json!({ "role": "poet", "novel_id": novel, "user_input": "Write" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Unknown assistant role: poet");
}

#[tokio::test]
async fn test_assistant_exchange_is_recorded() {
    let app = test_app().await;
    let novel = create_novel(&app, "Ashfall").await;

    let (status, body) = post(
        &app,
        "/api/ai-assistants/generate",
        json!({ "role": "Novelist", "novel_id": novel, "user_input": "Draft chapter one" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["role"], "novelist");
    assert!(body["content"].as_str().unwrap().starts_with("[mock:openai/gpt-4]"));

    let (_, history) = get(&app, &format!("/api/novels/{}/conversations", novel)).await;
    assert_eq!(history.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_multiple_versions() {
    let app = test_app().await;
    let novel = create_novel(&app, "Ashfall").await;

    let (status, body) = post(
        &app,
        "/api/ai-assistants/generate-multiple?num_versions=3",
        json!({ "role": "novelist", "novel_id": novel, "user_input": "Draft chapter one" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["count"], 3);
    assert_eq!(body["versions"].as_array().unwrap().len(), 3);

    let (status, body) = post(
        &app,
        "/api/ai-assistants/generate-multiple",
        json!({ "role": "evaluator", "novel_id": novel, "user_input": "Score this" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Multiple versions only supported for 'novelist' role");

    let (status, _) = post(
        &app,
        "/api/ai-assistants/generate-multiple?num_versions=9",
        json!({ "role": "novelist", "novel_id": novel, "user_input": "Draft" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ai_routes_are_rate_limited() {
    let mut config = test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.requests_per_minute = 1;
    let app = test_app_with(config).await;

    let (status, _) = get(&app, "/api/ai-assistants").await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = get(&app, "/api/ai-assistants").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error_code"], "RATE_LIMITED");

    // story routes are not limited
    let (status, _) = get(&app, "/api/novels").await;
    assert_eq!(status, StatusCode::OK);
}
