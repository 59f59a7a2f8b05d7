//! Router, shared state, and handlers for the companion API.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{
        sse::{Event, KeepAlive, Sse},
        Response,
    },
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use mindful_core::{
    immediate_resources, welcome_message, ChatMessage, ChatSession, CrisisResource,
    EmergencyEvent, InMemoryTranscript, ResponseOrchestrator, SessionError, UserProfile,
    CRISIS_RESOURCES, QUICK_ACTIONS,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

type Session = ChatSession<InMemoryTranscript>;
type ApiError = (StatusCode, String);

const SESSION_EMERGENCY_CAPACITY: usize = 16;

/// One live conversation: the session, its own emergency channel, and when it was last used.
struct SessionEntry {
    session: Arc<Session>,
    emergency_tx: broadcast::Sender<EmergencyEvent>,
    last_active: Mutex<Instant>,
}

impl SessionEntry {
    fn touch(&self) {
        *self.last_active.lock().unwrap_or_else(|e| e.into_inner()) = Instant::now();
    }

    fn last_active(&self) -> Instant {
        *self.last_active.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[derive(Clone)]
pub struct AppState {
    orchestrator: Arc<ResponseOrchestrator>,
    sessions: Arc<DashMap<Uuid, Arc<SessionEntry>>>,
}

impl AppState {
    pub fn new(orchestrator: Arc<ResponseOrchestrator>) -> Self {
        Self {
            orchestrator,
            sessions: Arc::new(DashMap::new()),
        }
    }

    fn entry(&self, id: Uuid) -> Result<Arc<SessionEntry>, ApiError> {
        let entry = self
            .sessions
            .get(&id)
            .map(|e| Arc::clone(e.value()))
            .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown session {}", id)))?;
        entry.touch();
        Ok(entry)
    }

    fn session(&self, id: Uuid) -> Result<Arc<Session>, ApiError> {
        self.entry(id).map(|e| Arc::clone(&e.session))
    }

    /// Emergency events raised by session `id` only.
    fn subscribe_emergencies(&self, id: Uuid) -> Result<broadcast::Receiver<EmergencyEvent>, ApiError> {
        self.entry(id).map(|e| e.emergency_tx.subscribe())
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions idle for at least `ttl`. Returns how many were removed.
    pub fn evict_idle(&self, ttl: Duration) -> usize {
        self.evict_idle_at(Instant::now(), ttl)
    }

    fn evict_idle_at(&self, now: Instant, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, e| now.saturating_duration_since(e.last_active()) < ttl);
        before.saturating_sub(self.sessions.len())
    }
}

/// Periodically evict sessions idle longer than `ttl`.
pub fn spawn_idle_eviction(state: AppState, ttl: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval((ttl / 4).max(Duration::from_secs(1)));
        loop {
            tick.tick().await;
            let evicted = state.evict_idle(ttl);
            if evicted > 0 {
                tracing::info!(
                    target: "mindful::session",
                    evicted,
                    remaining = state.session_count(),
                    "idle sessions evicted"
                );
            }
        }
    })
}

#[derive(Serialize)]
struct SessionCreated {
    session_id: Uuid,
    welcome: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct MessageRequest {
    message: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: ChatMessage,
    emergency: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    resources: Option<Vec<CrisisResource>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/welcome", post(welcome_handler))
        .route("/api/v1/resources", get(resources_handler))
        .route("/api/v1/sessions", post(create_session))
        .route("/api/v1/sessions/:id", axum::routing::delete(delete_session))
        .route("/api/v1/sessions/:id/messages", post(post_message))
        .route("/api/v1/sessions/:id/transcript", get(transcript_handler))
        .route("/api/v1/sessions/:id/emergency/stream", get(emergency_stream))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_requests))
}

async fn log_requests(request: Request<Body>, next: Next) -> Response {
    tracing::info!(method = %request.method(), path = %request.uri().path(), "request");
    next.run(request).await
}

async fn health() -> &'static str {
    "OK"
}

/// POST /api/v1/welcome: compose the greeting for a profile without opening a session.
async fn welcome_handler(Json(profile): Json<UserProfile>) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "welcome": welcome_message(&profile) }))
}

/// GET /api/v1/resources: crisis lines and starter prompts for the host UI.
async fn resources_handler() -> Json<serde_json::Value> {
    let with_uri: Vec<serde_json::Value> = CRISIS_RESOURCES
        .iter()
        .map(|r| {
            serde_json::json!({
                "name": r.name,
                "contact": r.contact,
                "description": r.description,
                "kind": r.kind,
                "available_24_7": r.available_24_7,
                "dial_uri": r.dial_uri(),
            })
        })
        .collect();
    Json(serde_json::json!({
        "resources": with_uri,
        "quick_actions": QUICK_ACTIONS,
    }))
}

/// POST /api/v1/sessions: start a conversation for the given profile.
async fn create_session(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let (emergency_tx, _) = broadcast::channel(SESSION_EMERGENCY_CAPACITY);
    let session = ChatSession::start(
        Arc::clone(&state.orchestrator),
        profile,
        InMemoryTranscript::new(),
    )
    .map_err(session_error)?
    .with_emergency_handler(Arc::new(emergency_tx.clone()));
    let id = Uuid::new_v4();
    let welcome = session.welcome();
    state.sessions.insert(
        id,
        Arc::new(SessionEntry {
            session: Arc::new(session),
            emergency_tx,
            last_active: Mutex::new(Instant::now()),
        }),
    );
    tracing::info!(session = %id, "session started");
    Ok((
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id: id,
            welcome,
        }),
    ))
}

/// DELETE /api/v1/sessions/:id: end a conversation and drop its transcript.
/// Open emergency streams for it close.
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .sessions
        .remove(&id)
        .map(|_| {
            tracing::info!(session = %id, "session ended");
            StatusCode::NO_CONTENT
        })
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("unknown session {}", id)))
}

/// POST /api/v1/sessions/:id/messages: one user message in, one assistant message out.
async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let session = state.session(id)?;
    let reply = session.submit(&body.message).await.map_err(session_error)?;
    let emergency = reply.is_crisis();
    let resources = emergency.then(|| immediate_resources().copied().collect());
    Ok(Json(MessageResponse {
        message: reply,
        emergency,
        resources,
    }))
}

async fn transcript_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, ApiError> {
    let session = state.session(id)?;
    session.transcript().map(Json).map_err(session_error)
}

/// GET /api/v1/sessions/:id/emergency/stream: SSE of `emergency` events raised by this
/// session's messages, for its crisis modal. Ends when the session is dropped.
async fn emergency_stream(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<
    Sse<impl futures_util::Stream<Item = Result<Event, std::convert::Infallible>> + Send + 'static>,
    ApiError,
> {
    use async_stream::stream;
    let mut rx = state.subscribe_emergencies(id)?;
    let stream = stream! {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    yield Ok(Event::default()
                        .event("emergency")
                        .json_data(event)
                        .unwrap_or_else(|_| Event::default().event("emergency").data("{}")));
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(session = %id, skipped = n, "emergency stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn session_error(e: SessionError) -> ApiError {
    match e {
        SessionError::EmptyMessage => (StatusCode::BAD_REQUEST, e.to_string()),
        SessionError::Transcript(_) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}
