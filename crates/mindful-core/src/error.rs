//! Error types for the companion core.

use thiserror::Error;

use crate::message::FallbackKind;

/// Failures of the remote generation call. The orchestrator recovers all of them.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Gemini API key not configured")]
    MissingApiKey,

    #[error("Gemini request timed out")]
    Timeout,

    #[error("Gemini request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Gemini API error {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Gemini response malformed: {0}")]
    Malformed(String),

    #[error("Gemini HTTP client could not be built: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl GenerationError {
    pub fn kind(&self) -> FallbackKind {
        match self {
            Self::MissingApiKey | Self::ClientBuild(_) => FallbackKind::ConfigurationMissing,
            Self::Timeout | Self::Transport(_) | Self::Status { .. } => FallbackKind::TransportFailure,
            Self::Malformed(_) => FallbackKind::MalformedResponse,
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Malformed(err.to_string())
        } else {
            Self::Transport(err)
        }
    }
}

/// Errors surfaced by a [`crate::ChatSession`] to its host.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("transcript error: {0}")]
    Transcript(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
