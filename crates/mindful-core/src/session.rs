//! Chat session: binds a profile and a transcript to the shared orchestrator.

use std::sync::Arc;

use crate::emergency::EmergencyHandler;
use crate::error::SessionError;
use crate::message::{ChatMessage, ResponseSource};
use crate::orchestrator::ResponseOrchestrator;
use crate::profile::UserProfile;
use crate::transcript::TranscriptRepository;
use crate::welcome::welcome_message;

pub struct ChatSession<R: TranscriptRepository> {
    orchestrator: Arc<ResponseOrchestrator>,
    profile: UserProfile,
    transcript: R,
    escalation: Option<Arc<dyn EmergencyHandler>>,
}

impl<R: TranscriptRepository> ChatSession<R> {
    /// Create the session and append the profile's welcome message.
    pub fn start(
        orchestrator: Arc<ResponseOrchestrator>,
        profile: UserProfile,
        transcript: R,
    ) -> Result<Self, SessionError> {
        let welcome = ChatMessage::assistant(welcome_message(&profile), ResponseSource::Welcome);
        transcript.append(welcome).map_err(SessionError::Transcript)?;
        Ok(Self {
            orchestrator,
            profile,
            transcript,
            escalation: None,
        })
    }

    /// Crisis events from this session's messages also go to `handler`.
    pub fn with_emergency_handler(mut self, handler: Arc<dyn EmergencyHandler>) -> Self {
        self.escalation = Some(handler);
        self
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// The welcome message appended by [`ChatSession::start`].
    pub fn welcome(&self) -> Option<ChatMessage> {
        self.transcript
            .list()
            .ok()
            .and_then(|m| m.into_iter().find(|m| m.source() == Some(ResponseSource::Welcome)))
    }

    /// Await the reply, then record the user's message and the reply as one exchange.
    /// Blank input is rejected before anything is recorded.
    ///
    /// A crisis event has already been delivered by the time the exchange is written,
    /// so a transcript failure never suppresses escalation; the caller gets the error
    /// and the transcript holds neither message.
    pub async fn submit(&self, text: &str) -> Result<ChatMessage, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        let user = ChatMessage::user(text);
        let reply = self
            .orchestrator
            .respond_escalating(text, &self.profile, self.escalation.as_deref())
            .await;
        tracing::debug!(
            target: "mindful::session",
            source = ?reply.source(),
            "reply ready"
        );
        self.transcript
            .append_exchange(user, reply.clone())
            .map_err(SessionError::Transcript)?;
        Ok(reply)
    }

    pub fn transcript(&self) -> Result<Vec<ChatMessage>, SessionError> {
        self.transcript.list().map_err(SessionError::Transcript)
    }
}
