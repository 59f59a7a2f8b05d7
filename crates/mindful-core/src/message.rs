//! Chat messages and the metadata the orchestrator attaches to assistant replies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::responder::MoodCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// Why the remote path fell back to a canned reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackKind {
    ConfigurationMissing,
    TransportFailure,
    MalformedResponse,
}

/// Which strategy produced an assistant message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ResponseSource {
    Welcome,
    Crisis,
    Local(MoodCategory),
    Remote,
    Fallback(FallbackKind),
}

/// One transcript entry. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    id: Uuid,
    content: String,
    sender: Sender,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mood: Option<MoodCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<ResponseSource>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            mood: None,
            source: None,
        }
    }

    pub fn assistant(content: impl Into<String>, source: ResponseSource) -> Self {
        let mood = match source {
            ResponseSource::Local(category) => Some(category),
            _ => None,
        };
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender: Sender::Assistant,
            timestamp: Utc::now(),
            mood,
            source: Some(source),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn mood(&self) -> Option<MoodCategory> {
        self.mood
    }

    pub fn source(&self) -> Option<ResponseSource> {
        self.source
    }

    /// True when this reply came from the crisis path.
    pub fn is_crisis(&self) -> bool {
        self.source == Some(ResponseSource::Crisis)
    }
}
