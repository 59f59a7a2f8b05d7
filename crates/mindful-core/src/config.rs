//! Companion configuration: defaults, optional TOML file, then `MINDFUL__*` environment.
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | gemini_api_key | none | Gemini credential. `GEMINI_API_KEY` is also honoured. |
//! | gemini_base_url | Google v1beta | Override for proxies and tests. |
//! | gemini_model | gemini-pro | Model used by `generateContent`. |
//! | request_timeout_secs | 20 | Upper bound on one remote call. |
//! | temperature | 0.7 | Sampling temperature. |
//! | max_output_tokens | 512 | Reply length cap. |
//! | template_seed | none | Seeds canned-reply selection when set. |
//! | extra_crisis_patterns | [] | Phrases added to the built-in crisis set (TOML list). |
//! | bind_addr | 127.0.0.1:8000 | Gateway listen address. |
//! | session_idle_ttl_secs | 1800 | Gateway drops sessions idle this long. |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";
const DEFAULT_CONFIG_PATH: &str = "config/mindful";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionConfig {
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub request_timeout_secs: u64,
    pub temperature: f32,
    pub max_output_tokens: u32,
    #[serde(default)]
    pub template_seed: Option<u64>,
    #[serde(default)]
    pub extra_crisis_patterns: Vec<String>,
    pub bind_addr: String,
    pub session_idle_ttl_secs: u64,
}

impl Default for CompanionConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            request_timeout_secs: 20,
            temperature: 0.7,
            max_output_tokens: 512,
            template_seed: None,
            extra_crisis_patterns: Vec::new(),
            bind_addr: "127.0.0.1:8000".to_string(),
            session_idle_ttl_secs: 30 * 60,
        }
    }
}

impl CompanionConfig {
    /// Load from `MINDFUL_CONFIG` (or `config/mindful.toml`) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("MINDFUL_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    /// Load with an explicit file path. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let d = Self::default();
        let builder = config::Config::builder()
            .set_default("gemini_base_url", d.gemini_base_url)?
            .set_default("gemini_model", d.gemini_model)?
            .set_default("request_timeout_secs", d.request_timeout_secs)?
            .set_default("temperature", d.temperature as f64)?
            .set_default("max_output_tokens", d.max_output_tokens as u64)?
            .set_default("bind_addr", d.bind_addr)?
            .set_default("session_idle_ttl_secs", d.session_idle_ttl_secs)?
            .add_source(config::File::from(path).required(false))
            .add_source(config::Environment::with_prefix("MINDFUL").separator("__"));

        let mut cfg: Self = builder.build()?.try_deserialize()?;
        if cfg.api_key().is_none() {
            cfg.gemini_api_key = std::env::var("GEMINI_API_KEY").ok();
        }
        cfg.validate()?;
        Ok(cfg)
    }

    /// Trimmed key, or `None` when unset or blank.
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_idle_ttl(&self) -> Duration {
        Duration::from_secs(self.session_idle_ttl_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be > 0".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} outside 0.0..=2.0",
                self.temperature
            )));
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::Invalid("max_output_tokens must be > 0".into()));
        }
        if self.session_idle_ttl_secs == 0 {
            return Err(ConfigError::Invalid("session_idle_ttl_secs must be > 0".into()));
        }
        Ok(())
    }
}
