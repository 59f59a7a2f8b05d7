//! Conversation transcript repository. The host owns storage; the session only appends.

use std::sync::RwLock;

use crate::message::ChatMessage;

/// Append-only message log for one conversation.
pub trait TranscriptRepository: Send + Sync {
    fn append(&self, message: ChatMessage) -> Result<(), String>;
    fn list(&self) -> Result<Vec<ChatMessage>, String>;

    /// Append a user message and its reply. Stores that can should record both or neither.
    fn append_exchange(&self, user: ChatMessage, reply: ChatMessage) -> Result<(), String> {
        self.append(user)?;
        self.append(reply)
    }

    fn len(&self) -> usize {
        self.list().map(|m| m.len()).unwrap_or(0)
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTranscript {
    messages: RwLock<Vec<ChatMessage>>,
}

impl InMemoryTranscript {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TranscriptRepository for InMemoryTranscript {
    fn append(&self, message: ChatMessage) -> Result<(), String> {
        self.messages
            .write()
            .map_err(|e| format!("transcript lock poisoned: {}", e))?
            .push(message);
        Ok(())
    }

    fn append_exchange(&self, user: ChatMessage, reply: ChatMessage) -> Result<(), String> {
        let mut messages = self
            .messages
            .write()
            .map_err(|e| format!("transcript lock poisoned: {}", e))?;
        messages.push(user);
        messages.push(reply);
        Ok(())
    }

    fn list(&self) -> Result<Vec<ChatMessage>, String> {
        self.messages
            .read()
            .map(|m| m.clone())
            .map_err(|e| format!("transcript lock poisoned: {}", e))
    }

    fn len(&self) -> usize {
        self.messages.read().map(|m| m.len()).unwrap_or(0)
    }
}
