//! User profile as supplied by the host UI (onboarding). Read-only to the core.

use serde::{Deserialize, Deserializer, Serialize};

/// Age band selected at onboarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "13-15")]
    EarlyTeen,
    #[serde(rename = "16-18")]
    LateTeen,
    /// Onboarding stores "19-24"; older welcome copy used "18-24".
    #[serde(rename = "19-24", alias = "18-24")]
    YoungAdult,
}

impl AgeGroup {
    /// Parse an onboarding label. Unknown or empty labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "13-15" => Some(Self::EarlyTeen),
            "16-18" => Some(Self::LateTeen),
            "19-24" | "18-24" => Some(Self::YoungAdult),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::EarlyTeen => "13-15",
            Self::LateTeen => "16-18",
            Self::YoungAdult => "19-24",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TonePreference {
    #[default]
    Gentle,
    Direct,
    Coaching,
}

impl TonePreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gentle => "gentle",
            Self::Direct => "direct",
            Self::Coaching => "coaching",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    #[default]
    Text,
    Voice,
    Both,
}

/// Profile attributes the companion reads. Unknown onboarding fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, deserialize_with = "lenient_age_group")]
    pub age_group: Option<AgeGroup>,
    #[serde(default)]
    pub pronouns: String,
    #[serde(default)]
    pub tone_preference: TonePreference,
    #[serde(default)]
    pub interaction_mode: InteractionMode,
    #[serde(default)]
    pub name: Option<String>,
}

// Onboarding starts with `ageGroup: ""` until a band is picked.
fn lenient_age_group<'de, D>(deserializer: D) -> Result<Option<AgeGroup>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(AgeGroup::parse))
}

impl UserProfile {
    pub fn new(age_group: Option<AgeGroup>, tone_preference: TonePreference) -> Self {
        Self {
            age_group,
            tone_preference,
            ..Self::default()
        }
    }

    pub fn with_pronouns(mut self, pronouns: &str) -> Self {
        self.pronouns = pronouns.to_string();
        self
    }

    /// Trimmed pronouns, or `None` when blank.
    pub fn pronouns(&self) -> Option<&str> {
        let p = self.pronouns.trim();
        if p.is_empty() {
            None
        } else {
            Some(p)
        }
    }
}
