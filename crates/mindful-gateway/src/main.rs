//! Mindful Gateway: HTTP host for the companion chat pipeline.
//! Holds the Gemini key server-side; the UI only sees messages and emergency events.

mod app;

use std::sync::Arc;

use mindful_core::{build_orchestrator, CompanionConfig, NoopEmergencyHandler};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[mindful-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match CompanionConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("[mindful-gateway] {}", e);
            std::process::exit(1);
        }
    };

    // Escalation is delivered per session; see `app::create_session`.
    let orchestrator = Arc::new(build_orchestrator(&config, Arc::new(NoopEmergencyHandler)));
    tracing::info!(
        remote = orchestrator.has_remote(),
        crisis_patterns = orchestrator.classifier().patterns().len(),
        version = mindful_core::version(),
        "companion orchestrator ready"
    );

    let state = app::AppState::new(orchestrator);
    app::spawn_idle_eviction(state.clone(), config.session_idle_ttl());
    let router = app::router(state);

    let listener = match tokio::net::TcpListener::bind(&config.bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("[mindful-gateway] bind {} failed: {}", config.bind_addr, e);
            std::process::exit(1);
        }
    };
    tracing::info!("[mindful-gateway] listening on {}", config.bind_addr);

    if let Err(e) = axum::serve(listener, router).await {
        tracing::error!("[mindful-gateway] server error: {}", e);
    }
}
