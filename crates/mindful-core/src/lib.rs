//! mindful-core: the companion's chat pipeline.
//!
//! Crisis phrases escalate first, mood keywords get a canned local reply, and everything
//! else goes to Gemini with fixed fallbacks when that call can't produce text.

pub mod config;
pub mod crisis;
pub mod emergency;
pub mod error;
pub mod gemini;
pub mod message;
pub mod orchestrator;
pub mod profile;
pub mod resources;
pub mod responder;
pub mod session;
pub mod transcript;
pub mod welcome;

pub use config::CompanionConfig;
pub use crisis::{classify, CrisisClassifier, CRISIS_PATTERNS};
pub use emergency::{EmergencyEvent, EmergencyHandler, NoopEmergencyHandler};
pub use error::{ConfigError, GenerationError, SessionError};
pub use gemini::{extract_text, GeminiClient, GenerationBackend};
pub use message::{ChatMessage, FallbackKind, ResponseSource, Sender};
pub use orchestrator::{
    fallback_reply, ResponseOrchestrator, CONFIGURATION_REPLY, CRISIS_REPLY, MALFORMED_REPLY,
    TRANSPORT_REPLY,
};
pub use profile::{AgeGroup, InteractionMode, TonePreference, UserProfile};
pub use resources::{immediate_resources, ContactKind, CrisisResource, CRISIS_RESOURCES};
pub use responder::{
    default_templates, LocalReply, LocalResponder, LocalRule, MoodCategory, TemplateSelection,
    DEFAULT_RULES,
};
pub use session::ChatSession;
pub use transcript::{InMemoryTranscript, TranscriptRepository};
pub use welcome::{tone_framing, welcome_message, QUICK_ACTIONS};

use std::sync::Arc;

/// Build the orchestrator described by `config`: Gemini when a key is present,
/// seeded template selection when `template_seed` is set, and the built-in crisis
/// phrases plus `extra_crisis_patterns`.
pub fn build_orchestrator(
    config: &CompanionConfig,
    emergency: Arc<dyn EmergencyHandler>,
) -> ResponseOrchestrator {
    let selection = match config.template_seed {
        Some(seed) => TemplateSelection::seeded(seed),
        None => TemplateSelection::from_entropy(),
    };
    let backend = match GeminiClient::from_config(config) {
        Ok(Some(client)) => Some(Arc::new(client) as Arc<dyn GenerationBackend>),
        Ok(None) => {
            tracing::warn!(target: "mindful::orchestrator", "GEMINI_API_KEY not set; remote replies disabled");
            None
        }
        Err(e) => {
            tracing::error!(target: "mindful::orchestrator", error = %e, "remote replies disabled");
            None
        }
    };
    let classifier = CrisisClassifier::with_extra_patterns(&config.extra_crisis_patterns);
    ResponseOrchestrator::new(LocalResponder::new(selection), backend, emergency)
        .with_classifier(classifier)
}

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
