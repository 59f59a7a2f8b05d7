//! Emergency escalation: the event the orchestrator emits on a crisis match.
//!
//! Handlers run synchronously inside `respond`, before the safety reply is returned.
//! Channel senders are supported so a host can forward events to a modal or SSE stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyEvent {
    pub triggered_at: DateTime<Utc>,
}

impl EmergencyEvent {
    pub fn now() -> Self {
        Self {
            triggered_at: Utc::now(),
        }
    }
}

/// Receives emergency events. Must not block for long; the reply waits on it.
pub trait EmergencyHandler: Send + Sync {
    fn on_emergency(&self, event: &EmergencyEvent);
}

impl<F> EmergencyHandler for F
where
    F: Fn(&EmergencyEvent) + Send + Sync,
{
    fn on_emergency(&self, event: &EmergencyEvent) {
        self(event)
    }
}

impl EmergencyHandler for std::sync::mpsc::Sender<EmergencyEvent> {
    fn on_emergency(&self, event: &EmergencyEvent) {
        if self.send(*event).is_err() {
            tracing::warn!(target: "mindful::crisis", "emergency receiver dropped");
        }
    }
}

impl EmergencyHandler for std::sync::mpsc::SyncSender<EmergencyEvent> {
    fn on_emergency(&self, event: &EmergencyEvent) {
        if self.try_send(*event).is_err() {
            tracing::warn!(target: "mindful::crisis", "emergency receiver full or dropped");
        }
    }
}

impl EmergencyHandler for tokio::sync::mpsc::UnboundedSender<EmergencyEvent> {
    fn on_emergency(&self, event: &EmergencyEvent) {
        if self.send(*event).is_err() {
            tracing::warn!(target: "mindful::crisis", "emergency receiver dropped");
        }
    }
}

impl EmergencyHandler for tokio::sync::broadcast::Sender<EmergencyEvent> {
    fn on_emergency(&self, event: &EmergencyEvent) {
        // No subscribers is normal when no UI is listening.
        let _ = self.send(*event);
    }
}

/// Drops events. Used when the host has no escalation surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmergencyHandler;

impl EmergencyHandler for NoopEmergencyHandler {
    fn on_emergency(&self, _event: &EmergencyEvent) {}
}
