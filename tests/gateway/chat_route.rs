use crate::fakes::{NeverBusy, Script, ScriptedProvider};
use moodline::chat::{TurnOrchestrator, TurnSettings};
use moodline::config::Config;
use moodline::gateway::run_gateway_with_orchestrator;
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

struct GatewayTestServer {
    port: u16,
    handle: tokio::task::JoinHandle<anyhow::Result<()>>,
}

impl GatewayTestServer {
    async fn start(script: Script, generation_timeout: Duration) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("ephemeral gateway listener should bind");
        let port = listener
            .local_addr()
            .expect("ephemeral gateway listener should expose local address")
            .port();

        let settings = TurnSettings {
            generation_timeout,
            ..TurnSettings::default()
        };
        let orchestrator = TurnOrchestrator::new(
            Arc::new(ScriptedProvider::new(script)),
            settings,
            Arc::new(NeverBusy { value: 12 }),
        )
        .expect("orchestrator should build");

        let handle = tokio::spawn(async move {
            run_gateway_with_orchestrator(listener, Arc::new(orchestrator), &Config::default())
                .await
        });

        Self { port, handle }
    }

    fn url(&self, route: &str) -> String {
        format!("http://127.0.0.1:{}{route}", self.port)
    }
}

impl Drop for GatewayTestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn post_chat(server: &GatewayTestServer, body: Value) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(server.url("/api/chat"))
        .json(&body)
        .send()
        .await
        .expect("chat request should reach gateway");
    let status = response.status();
    let body = response.json::<Value>().await.expect("response should be JSON");
    (status, body)
}

#[tokio::test]
async fn health_reports_ok() {
    let server = GatewayTestServer::start(Script::Reply("hi"), Duration::from_secs(5)).await;
    let body: Value = reqwest::get(server.url("/health"))
        .await
        .expect("health request should succeed")
        .json()
        .await
        .expect("health body should be JSON");
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn chat_returns_bubbles_and_state() {
    let server =
        GatewayTestServer::start(Script::Reply("hey!\nhow's it going?"), Duration::from_secs(5))
            .await;
    let (status, body) = post_chat(
        &server,
        json!({ "message": "hello", "conversationHistory": [] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filtered"], false);
    assert_eq!(body["messages"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["messages"][0]["text"], "hey!");
    assert_eq!(body["moodState"]["currentMood"], "friendly");
    assert_eq!(body["moodState"]["recentMessages"][0]["text"], "hello");
    assert_eq!(body["moodInfo"]["previousMood"], "friendly");
}

#[tokio::test]
async fn state_round_trips_between_turns() {
    let server = GatewayTestServer::start(Script::Reply("ok"), Duration::from_secs(5)).await;
    let (_, first) = post_chat(&server, json!({ "message": "you are so annoying" })).await;
    assert_eq!(first["moodState"]["currentMood"], "slightly_annoyed");

    let (status, second) = post_chat(
        &server,
        json!({ "message": "sorry, my bad", "moodState": first["moodState"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["moodInfo"]["previousMood"], "slightly_annoyed");
    assert_eq!(
        second["moodState"]["recentMessages"].as_array().map(Vec::len),
        Some(2)
    );
}

#[tokio::test]
async fn blank_message_is_bad_request() {
    let server = GatewayTestServer::start(Script::Reply("hi"), Duration::from_secs(5)).await;
    let (status, body) = post_chat(&server, json!({ "message": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(body["details"].is_string());

    let (status, _) = post_chat(&server, json!({ "conversationHistory": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let server = GatewayTestServer::start(Script::Reply("hi"), Duration::from_secs(5)).await;
    let response = reqwest::Client::new()
        .post(server.url("/api/chat"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("request should reach gateway");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn corrupt_mood_state_is_server_error() {
    let server = GatewayTestServer::start(Script::Reply("hi"), Duration::from_secs(5)).await;
    let (status, body) = post_chat(
        &server,
        json!({
            "message": "hello",
            "moodState": {
                "currentMood": "friendly",
                "moodIntensity": 0,
                "lastMoodChangeTimestamp": "2024-01-01T00:00:00Z",
                "recentMessages": [],
                "conversationContext": {
                    "userApologized": false,
                    "aiApologized": false,
                    "lastUserMessageTimestamp": "2024-01-01T00:00:00Z"
                }
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Corrupt mood state");
}

#[tokio::test]
async fn hung_generation_degrades_within_timeout() {
    let server = GatewayTestServer::start(Script::Hang, Duration::from_millis(200)).await;
    let (status, body) = post_chat(&server, json!({ "message": "hello there" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"][0]["text"], "::cancel_typing::12");
    assert!(body.get("moodInfo").is_none());
}
