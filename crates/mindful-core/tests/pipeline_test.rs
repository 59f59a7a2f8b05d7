//! Integration test: the full respond pipeline against scripted Gemini backends.
//!
//! ## Scenarios
//! 1. Every input gets a non-empty reply, whatever the backend does.
//! 2. Crisis phrases escalate exactly once and never reach the backend.
//! 3. "give up" in a harmless sentence still escalates.
//! 4. Mood keywords answer locally without a network call.
//! 5. Transport and malformed failures produce distinct fallback replies.
//! 6. Welcome composition for a 16-18 / direct / they/them profile.
//! 7. The classifier is pure.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use mindful_core::{
    classify, default_templates, AgeGroup, ChatSession, EmergencyEvent, FallbackKind,
    GenerationBackend, GenerationError, InMemoryTranscript, LocalResponder, MoodCategory,
    ResponseOrchestrator, ResponseSource, TemplateSelection, TonePreference, UserProfile,
    CRISIS_PATTERNS, CRISIS_REPLY, MALFORMED_REPLY, TRANSPORT_REPLY,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
enum Script {
    Reply,
    Transport,
    Status,
    Timeout,
    Malformed,
}

struct ScriptedBackend {
    script: Script,
    calls: AtomicUsize,
    last_system: std::sync::Mutex<Option<String>>,
}

impl ScriptedBackend {
    fn new(script: Script) -> Arc<Self> {
        Arc::new(Self {
            script,
            calls: AtomicUsize::new(0),
            last_system: std::sync::Mutex::new(None),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_system.lock().unwrap() = system.map(str::to_string);
        match self.script {
            Script::Reply => Ok(format!("echo: {}", prompt)),
            Script::Transport => Err(GenerationError::Status {
                status: 502,
                body: "bad gateway".into(),
            }),
            Script::Status => Err(GenerationError::Status {
                status: 401,
                body: "unauthorized".into(),
            }),
            Script::Timeout => Err(GenerationError::Timeout),
            Script::Malformed => Err(GenerationError::Malformed("no candidates".into())),
        }
    }
}

struct Harness {
    orchestrator: ResponseOrchestrator,
    backend: Arc<ScriptedBackend>,
    emergencies: Arc<AtomicUsize>,
}

fn harness(script: Script) -> Harness {
    let backend = ScriptedBackend::new(script);
    let emergencies = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&emergencies);
    let orchestrator = ResponseOrchestrator::new(
        LocalResponder::new(TemplateSelection::seeded(11)),
        Some(backend.clone() as Arc<dyn GenerationBackend>),
        Arc::new(move |_: &EmergencyEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    );
    Harness {
        orchestrator,
        backend,
        emergencies,
    }
}

fn profile() -> UserProfile {
    UserProfile::new(Some(AgeGroup::LateTeen), TonePreference::Direct).with_pronouns("they/them")
}

// ===========================================================================
// Total response
// ===========================================================================

#[tokio::test]
async fn every_input_gets_a_non_empty_reply() {
    let inputs = [
        "hi",
        "I feel anxious",
        "what is the capital of France",
        "I want to end it all",
        "🙂",
    ];
    for script in [
        Script::Reply,
        Script::Transport,
        Script::Status,
        Script::Timeout,
        Script::Malformed,
    ] {
        let h = harness(script);
        for input in inputs {
            let reply = h.orchestrator.respond(input, &profile()).await;
            assert!(!reply.content().trim().is_empty(), "empty reply for {:?}", input);
        }
    }
}

// ===========================================================================
// Crisis precedence
// ===========================================================================

#[tokio::test]
async fn crisis_escalates_once_and_skips_remote() {
    for pattern in CRISIS_PATTERNS {
        let h = harness(Script::Reply);
        let text = format!("Sometimes I think about {}", pattern.to_uppercase());
        let reply = h.orchestrator.respond(&text, &profile()).await;
        assert_eq!(reply.content(), CRISIS_REPLY);
        assert!(reply.is_crisis());
        assert_eq!(h.emergencies.load(Ordering::SeqCst), 1, "{}", pattern);
        assert_eq!(h.backend.calls(), 0, "{}", pattern);
    }
}

#[tokio::test]
async fn crisis_outranks_mood_keywords() {
    let h = harness(Script::Reply);
    let reply = h
        .orchestrator
        .respond("I'm anxious and I want to hurt myself", &profile())
        .await;
    assert_eq!(reply.source(), Some(ResponseSource::Crisis));
    assert_eq!(h.emergencies.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn repeated_crisis_is_never_suppressed() {
    let h = harness(Script::Reply);
    for _ in 0..3 {
        h.orchestrator.respond("suicide", &profile()).await;
    }
    assert_eq!(h.emergencies.load(Ordering::SeqCst), 3);
    assert_eq!(h.backend.calls(), 0);
}

// ===========================================================================
// Substring boundary
// ===========================================================================

#[tokio::test]
async fn give_up_false_positive_is_preserved() {
    assert!(classify("I want to give up on my diet"));
    let h = harness(Script::Reply);
    let reply = h.orchestrator.respond("I want to give up on my diet", &profile()).await;
    assert!(reply.is_crisis());
}

// ===========================================================================
// Local before remote
// ===========================================================================

#[tokio::test]
async fn anxious_is_answered_locally() {
    let h = harness(Script::Reply);
    let reply = h.orchestrator.respond("I'm so ANXIOUS today", &profile()).await;
    assert_eq!(reply.source(), Some(ResponseSource::Local(MoodCategory::Anxiety)));
    assert_eq!(reply.mood(), Some(MoodCategory::Anxiety));
    assert!(default_templates(MoodCategory::Anxiety).contains(&reply.content()));
    assert_eq!(h.backend.calls(), 0);
    assert_eq!(h.emergencies.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unmatched_text_goes_remote_with_tone_framing() {
    let h = harness(Script::Reply);
    let reply = h.orchestrator.respond("tell me a fun fact", &profile()).await;
    assert_eq!(reply.content(), "echo: tell me a fun fact");
    assert_eq!(reply.source(), Some(ResponseSource::Remote));
    assert_eq!(h.backend.calls(), 1);
    let system = h.backend.last_system.lock().unwrap().clone().unwrap();
    assert!(system.contains("16-18"));
    assert!(system.contains("straightforward"));
}

// ===========================================================================
// Fallbacks
// ===========================================================================

#[tokio::test]
async fn transport_failures_use_reassurance_fallback() {
    for script in [Script::Transport, Script::Status, Script::Timeout] {
        let h = harness(script);
        let reply = h.orchestrator.respond("tell me a fun fact", &profile()).await;
        assert_eq!(reply.content(), TRANSPORT_REPLY);
        assert_eq!(
            reply.source(),
            Some(ResponseSource::Fallback(FallbackKind::TransportFailure))
        );
        // no automatic retry
        assert_eq!(h.backend.calls(), 1);
    }
}

#[tokio::test]
async fn malformed_reply_uses_distinct_fallback() {
    let h = harness(Script::Malformed);
    let reply = h.orchestrator.respond("tell me a fun fact", &profile()).await;
    assert_eq!(reply.content(), MALFORMED_REPLY);
    assert_ne!(reply.content(), TRANSPORT_REPLY);
    assert_eq!(
        reply.source(),
        Some(ResponseSource::Fallback(FallbackKind::MalformedResponse))
    );
}

// ===========================================================================
// Welcome + session
// ===========================================================================

#[tokio::test]
async fn welcome_message_composition() {
    let msg = mindful_core::welcome_message(&profile());
    assert!(msg.contains("High school can be tough"));
    assert!(msg.contains("I'll be clear and straightforward."));
    assert!(msg.contains("(they/them)"));
}

#[tokio::test]
async fn session_records_one_reply_per_message() {
    let h = harness(Script::Transport);
    let session = ChatSession::start(
        Arc::new(h.orchestrator),
        profile(),
        InMemoryTranscript::new(),
    )
    .unwrap();
    session.submit("I feel lonely").await.unwrap();
    session.submit("can you recommend a book?").await.unwrap();
    session.submit("better off dead").await.unwrap();
    let all = session.transcript().unwrap();
    // welcome + 3 * (user + assistant)
    assert_eq!(all.len(), 7);
    assert!(all[6].is_crisis());
    assert_eq!(h.emergencies.load(Ordering::SeqCst), 1);
}

// ===========================================================================
// Pure classifier
// ===========================================================================

#[test]
fn classifier_is_idempotent() {
    for text in ["I might overdose", "just a normal day", "GIVE UP"] {
        assert_eq!(classify(text), classify(text));
    }
}
