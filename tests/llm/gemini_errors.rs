use moodline::error::LlmError;
use moodline::llm::{
    FailureKind, GeminiProvider, Provider, ReliableProvider, attempt_timeout_secs,
    classify_failure,
};
use std::time::Duration;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROUTE: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new(Some("test-key"), 5).with_base_url(&server.uri())
}

async fn mount_error(server: &MockServer, status: u16, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(ROUTE))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn successful_generation_returns_joined_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ROUTE))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "role": "user", "parts": [{ "text": "hello" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "hey!" }, { "text": "what's up" }] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = provider(&server)
        .chat("hello", "gemini-1.5-flash", 0.7)
        .await
        .unwrap();
    assert_eq!(text, "hey!\nwhat's up");
}

#[tokio::test]
async fn invalid_key_maps_to_auth_error() {
    let server = MockServer::start().await;
    mount_error(
        &server,
        400,
        json!({ "error": {
            "code": 400,
            "message": "API key not valid. Please pass a valid API key.",
            "status": "INVALID_ARGUMENT",
            "details": [{ "reason": "API_KEY_INVALID" }]
        }}),
    )
    .await;

    let err = provider(&server)
        .chat("hello", "gemini-1.5-flash", 0.7)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LlmError>(),
        Some(LlmError::Auth { .. })
    ));
    assert_eq!(classify_failure(&err), FailureKind::InvalidCredential);
}

#[tokio::test]
async fn exhausted_quota_maps_to_quota_error() {
    let server = MockServer::start().await;
    mount_error(
        &server,
        429,
        json!({ "error": {
            "code": 429,
            "message": "Resource has been exhausted (e.g. check quota).",
            "status": "RESOURCE_EXHAUSTED"
        }}),
    )
    .await;

    let err = provider(&server)
        .chat("hello", "gemini-1.5-flash", 0.7)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LlmError>(),
        Some(LlmError::QuotaExceeded { .. })
    ));
}

#[tokio::test]
async fn server_error_is_generic_and_scrubbed() {
    let server = MockServer::start().await;
    mount_error(
        &server,
        500,
        json!({ "error": {
            "code": 500,
            "message": "internal failure for key=AIzaSyLeakedKey1234567890",
            "status": "INTERNAL"
        }}),
    )
    .await;

    let err = provider(&server)
        .chat("hello", "gemini-1.5-flash", 0.7)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LlmError>(),
        Some(LlmError::Request { .. })
    ));
    assert_eq!(classify_failure(&err), FailureKind::Generic);
    assert!(!err.to_string().contains("AIzaSyLeakedKey1234567890"));
}

#[tokio::test]
async fn reliable_wrapper_does_not_retry_quota() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ROUTE))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "code": 429, "message": "quota", "status": "RESOURCE_EXHAUSTED" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reliable = ReliableProvider::new(Box::new(provider(&server)), 3, 1);
    let err = reliable
        .chat("hello", "gemini-1.5-flash", 0.7)
        .await
        .unwrap_err();
    assert_eq!(classify_failure(&err), FailureKind::QuotaExceeded);
}

#[tokio::test]
async fn reliable_wrapper_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ROUTE))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(3)
        .mount(&server)
        .await;

    let reliable = ReliableProvider::new(Box::new(provider(&server)), 2, 1);
    let err = reliable
        .chat("hello", "gemini-1.5-flash", 0.7)
        .await
        .unwrap_err();
    assert_eq!(classify_failure(&err), FailureKind::Generic);
}

#[tokio::test]
async fn timed_out_attempt_is_retried_within_the_turn_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ROUTE))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "candidates": [{ "content": { "parts": [{ "text": "too late" }] } }]
                }))
                .set_delay(Duration::from_secs(5)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ROUTE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "made it" }] } }]
        })))
        .mount(&server)
        .await;

    let budget_secs = 3;
    let retries = 1;
    let per_attempt = attempt_timeout_secs(budget_secs, retries);
    assert_eq!(per_attempt, 1);

    let inner = GeminiProvider::new(Some("test-key"), per_attempt).with_base_url(&server.uri());
    let reliable = ReliableProvider::new(Box::new(inner), retries, 1);
    let text = tokio::time::timeout(
        Duration::from_secs(budget_secs),
        reliable.chat("hello", "gemini-1.5-flash", 0.7),
    )
    .await
    .expect("retry should finish inside the turn budget")
    .unwrap();
    assert_eq!(text, "made it");
}
