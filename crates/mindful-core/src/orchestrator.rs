//! Response Orchestrator: crisis check, then local rules, then the remote model.
//!
//! `respond` never fails. Every remote failure maps to a fixed fallback reply, and a
//! crisis match emits one [`EmergencyEvent`] and returns before any remote call.

use std::sync::Arc;

use crate::crisis::CrisisClassifier;
use crate::emergency::{EmergencyEvent, EmergencyHandler, NoopEmergencyHandler};
use crate::error::GenerationError;
use crate::gemini::GenerationBackend;
use crate::message::{ChatMessage, FallbackKind, ResponseSource};
use crate::profile::UserProfile;
use crate::responder::LocalResponder;
use crate::welcome::tone_framing;

pub const CRISIS_REPLY: &str = "I'm really concerned about your safety. If you're in immediate danger, \
please call 911 or text HOME to 741741. You are not alone. Would you like me to share crisis resources now?";

pub const MALFORMED_REPLY: &str = "I hear you — thank you for sharing that. Can you tell me more?";

pub const TRANSPORT_REPLY: &str =
    "I'm here with you. Even if I can't respond perfectly right now, you're not alone.";

pub const CONFIGURATION_REPLY: &str = "I'm here to listen. My extended replies aren't available right now, \
but you can keep sharing with me.";

/// Fixed reply for a fallback kind.
pub fn fallback_reply(kind: FallbackKind) -> &'static str {
    match kind {
        FallbackKind::ConfigurationMissing => CONFIGURATION_REPLY,
        FallbackKind::TransportFailure => TRANSPORT_REPLY,
        FallbackKind::MalformedResponse => MALFORMED_REPLY,
    }
}

pub struct ResponseOrchestrator {
    classifier: CrisisClassifier,
    responder: LocalResponder,
    backend: Option<Arc<dyn GenerationBackend>>,
    emergency: Arc<dyn EmergencyHandler>,
}

impl ResponseOrchestrator {
    /// `backend` is `None` when the remote credential is missing.
    pub fn new(
        responder: LocalResponder,
        backend: Option<Arc<dyn GenerationBackend>>,
        emergency: Arc<dyn EmergencyHandler>,
    ) -> Self {
        Self {
            classifier: CrisisClassifier::new(),
            responder,
            backend,
            emergency,
        }
    }

    /// Local-only orchestrator with no escalation surface.
    pub fn offline(responder: LocalResponder) -> Self {
        Self::new(responder, None, Arc::new(NoopEmergencyHandler))
    }

    pub fn with_classifier(mut self, classifier: CrisisClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn has_remote(&self) -> bool {
        self.backend.is_some()
    }

    pub fn classifier(&self) -> &CrisisClassifier {
        &self.classifier
    }

    /// Produce exactly one assistant message for `text`.
    pub async fn respond(&self, text: &str, profile: &UserProfile) -> ChatMessage {
        self.respond_escalating(text, profile, None).await
    }

    /// As [`respond`](Self::respond), and a crisis match is also delivered to `scoped`,
    /// the handler of the conversation that produced `text`. Both handlers receive the
    /// same event.
    pub async fn respond_escalating(
        &self,
        text: &str,
        profile: &UserProfile,
        scoped: Option<&dyn EmergencyHandler>,
    ) -> ChatMessage {
        if let Some(pattern) = self.classifier.matched_pattern(text) {
            tracing::warn!(target: "mindful::crisis", pattern, "crisis phrase detected; escalating");
            let event = EmergencyEvent::now();
            self.emergency.on_emergency(&event);
            if let Some(handler) = scoped {
                handler.on_emergency(&event);
            }
            return ChatMessage::assistant(CRISIS_REPLY, ResponseSource::Crisis);
        }

        if let Some(reply) = self.responder.respond(text) {
            tracing::debug!(
                target: "mindful::orchestrator",
                category = reply.category.as_str(),
                "local reply"
            );
            return ChatMessage::assistant(reply.text, ResponseSource::Local(reply.category));
        }

        if text.trim().is_empty() {
            return ChatMessage::assistant(
                MALFORMED_REPLY,
                ResponseSource::Fallback(FallbackKind::MalformedResponse),
            );
        }

        let Some(backend) = self.backend.as_ref() else {
            tracing::warn!(target: "mindful::orchestrator", "no Gemini key configured; skipping remote call");
            return fallback(FallbackKind::ConfigurationMissing);
        };

        let framing = tone_framing(profile);
        tracing::debug!(
            target: "mindful::orchestrator",
            tone = profile.tone_preference.as_str(),
            "remote reply requested"
        );
        match backend.generate(text, Some(&framing)).await {
            Ok(reply) => ChatMessage::assistant(reply, ResponseSource::Remote),
            Err(e) => {
                log_failure(&e);
                fallback(e.kind())
            }
        }
    }
}

fn fallback(kind: FallbackKind) -> ChatMessage {
    ChatMessage::assistant(fallback_reply(kind), ResponseSource::Fallback(kind))
}

fn log_failure(err: &GenerationError) {
    match err {
        GenerationError::Malformed(detail) => {
            tracing::warn!(target: "mindful::orchestrator", detail = %detail, "Gemini reply malformed; using fallback")
        }
        other => {
            tracing::warn!(target: "mindful::orchestrator", error = %other, "Gemini call failed; using fallback")
        }
    }
}
