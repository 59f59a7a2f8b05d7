//! Integration test: GeminiClient against a local axum stub of `generateContent`.
//!
//! Covers the wire schema, the extraction path, and how HTTP failures map onto
//! the orchestrator's fallback replies.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use mindful_core::{
    CompanionConfig, FallbackKind, GeminiClient, GenerationBackend, GenerationError,
    LocalResponder, NoopEmergencyHandler, ResponseOrchestrator, ResponseSource,
    TemplateSelection, UserProfile, MALFORMED_REPLY, TRANSPORT_REPLY,
};
use tokio::sync::Mutex;

#[derive(Clone, Copy)]
enum Mode {
    Ok,
    Malformed,
    ServerError,
    Slow,
}

#[derive(Clone)]
struct StubState {
    mode: Mode,
    seen: Arc<Mutex<Vec<(String, String, serde_json::Value)>>>,
}

async fn generate_content(
    State(state): State<StubState>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (StatusCode, Json<serde_json::Value>) {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.seen.lock().await.push((call, key, body));
    match state.mode {
        Mode::Ok => (
            StatusCode::OK,
            Json(serde_json::json!({
                "candidates": [{ "content": { "role": "model", "parts": [{ "text": "That sounds like a lot. What helps you unwind?" }] } }]
            })),
        ),
        Mode::Malformed => (
            StatusCode::OK,
            Json(serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } })),
        ),
        Mode::ServerError => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": { "code": 503, "message": "overloaded" } })),
        ),
        Mode::Slow => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            (StatusCode::OK, Json(serde_json::json!({})))
        }
    }
}

async fn spawn_stub(mode: Mode) -> (String, StubState) {
    let state = StubState {
        mode,
        seen: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1beta/models/:call", post(generate_content))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/v1beta", addr), state)
}

fn client(base_url: &str, timeout: Duration) -> GeminiClient {
    let cfg = CompanionConfig {
        gemini_api_key: Some("test-key".into()),
        gemini_base_url: base_url.to_string(),
        request_timeout_secs: timeout.as_secs().max(1),
        ..CompanionConfig::default()
    };
    GeminiClient::from_config(&cfg).unwrap().unwrap()
}

fn orchestrator(backend: GeminiClient) -> ResponseOrchestrator {
    ResponseOrchestrator::new(
        LocalResponder::new(TemplateSelection::First),
        Some(Arc::new(backend)),
        Arc::new(NoopEmergencyHandler),
    )
}

#[tokio::test]
async fn success_sends_chat_schema_and_extracts_text() {
    let (base, state) = spawn_stub(Mode::Ok).await;
    let text = client(&base, Duration::from_secs(5))
        .generate("school is a lot right now", Some("be gentle"))
        .await
        .unwrap();
    assert_eq!(text, "That sounds like a lot. What helps you unwind?");

    let seen = state.seen.lock().await;
    assert_eq!(seen.len(), 1);
    let (call, key, body) = &seen[0];
    assert_eq!(call, "gemini-pro:generateContent");
    assert_eq!(key, "test-key");
    assert_eq!(body["contents"][0]["role"], "user");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "school is a lot right now");
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be gentle");
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 512);
}

#[tokio::test]
async fn missing_text_path_is_malformed() {
    let (base, _) = spawn_stub(Mode::Malformed).await;
    let err = client(&base, Duration::from_secs(5))
        .generate("hello", None)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Malformed(_)));

    let (base, _) = spawn_stub(Mode::Malformed).await;
    let reply = orchestrator(client(&base, Duration::from_secs(5)))
        .respond("hello", &UserProfile::default())
        .await;
    assert_eq!(reply.content(), MALFORMED_REPLY);
}

#[tokio::test]
async fn non_success_status_is_transport_failure() {
    let (base, _) = spawn_stub(Mode::ServerError).await;
    let err = client(&base, Duration::from_secs(5))
        .generate("hello", None)
        .await
        .unwrap_err();
    assert!(matches!(err, GenerationError::Status { status: 503, .. }));

    let reply = orchestrator(client(&base, Duration::from_secs(5)))
        .respond("hello", &UserProfile::default())
        .await;
    assert_eq!(reply.content(), TRANSPORT_REPLY);
}

#[tokio::test]
async fn slow_upstream_times_out_into_transport_fallback() {
    let (base, state) = spawn_stub(Mode::Slow).await;
    let reply = orchestrator(client(&base, Duration::from_secs(1)))
        .respond("hello", &UserProfile::default())
        .await;
    assert_eq!(reply.content(), TRANSPORT_REPLY);
    assert_eq!(
        reply.source(),
        Some(ResponseSource::Fallback(FallbackKind::TransportFailure))
    );
    assert_eq!(state.seen.lock().await.len(), 1);
}

#[tokio::test]
async fn unreachable_host_is_transport_failure() {
    // Bind then drop to get a port with nothing listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let reply = orchestrator(client(&format!("http://{}/v1beta", addr), Duration::from_secs(2)))
        .respond("hello", &UserProfile::default())
        .await;
    assert_eq!(reply.content(), TRANSPORT_REPLY);
}
