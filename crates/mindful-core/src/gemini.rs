//! Gemini bridge: remote text generation for messages the local rules don't cover.
//!
//! Request: `POST {base}/models/{model}:generateContent` with the key in `x-goog-api-key`.
//! Body: `contents[0]` carries the raw user text; tone framing goes in `systemInstruction`.
//! Reply text is read from `candidates[0].content.parts[0].text`; anything else is
//! [`GenerationError::Malformed`].

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::CompanionConfig;
use crate::error::GenerationError;

/// A remote text generator. The orchestrator only sees this seam.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a reply to `prompt`. `system` is optional framing kept apart from the prompt.
    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, GenerationError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct SystemInstruction<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

// Every level optional: a missing field is a malformed reply, not a decode error.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Pull `candidates[0].content.parts[0].text` out of a raw body.
pub fn extract_text(body: &str) -> Result<String, GenerationError> {
    let parsed: GenerateResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Malformed(e.to_string()))?;
    let text = parsed
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .and_then(|p| p.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| GenerationError::Malformed("no candidates[0].content.parts[0].text".into()))?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::Malformed("empty text".into()));
    }
    Ok(trimmed.to_string())
}

pub struct GeminiClient {
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Build from config. `Ok(None)` when no key is configured, so callers can
    /// skip the network path entirely.
    pub fn from_config(config: &CompanionConfig) -> Result<Option<Self>, GenerationError> {
        let Some(key) = config.api_key() else {
            return Ok(None);
        };
        let client = Self::new(key, config.request_timeout())?
            .with_base_url(&config.gemini_base_url)
            .with_model(&config.gemini_model)
            .with_generation(config.temperature, config.max_output_tokens);
        Ok(Some(client))
    }

    /// The HTTP client always carries `timeout`; a client that cannot be built with it is an error.
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GenerationError::ClientBuild)?;
        Ok(Self {
            api_key: api_key.trim().to_string(),
            base_url: crate::config::DEFAULT_GEMINI_BASE_URL.to_string(),
            model: crate::config::DEFAULT_GEMINI_MODEL.to_string(),
            temperature: 0.7,
            max_output_tokens: 512,
            client,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_generation(mut self, temperature: f32, max_output_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_output_tokens = max_output_tokens;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate(&self, prompt: &str, system: Option<&str>) -> Result<String, GenerationError> {
        if self.api_key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: system.map(|s| SystemInstruction {
                parts: vec![Part { text: s }],
            }),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        tracing::debug!(target: "mindful::gemini", model = %self.model, "generateContent request");

        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = res.status();
        let text = res.text().await?;

        if !status.is_success() {
            let snippet: String = text.chars().take(300).collect();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: snippet,
            });
        }

        extract_text(&text)
    }
}
