//! Welcome message composer and tone framing for the remote model.

use crate::profile::{AgeGroup, TonePreference, UserProfile};

const DEFAULT_OPENING: &str = "Hi! I'm here to listen and support you.";
const LATE_TEEN_OPENING: &str = "Hey! High school can be tough, but I'm here to listen.";
const YOUNG_ADULT_OPENING: &str = "Hello! Life transitions can be overwhelming, and I'm here with you.";
const CLOSING_QUESTION: &str = "How are you feeling today?";

/// Starter prompts offered before the first message.
pub const QUICK_ACTIONS: &[&str] = &[
    "I want to reflect in my journal",
    "Can you check in on my mood?",
    "Guide me through a grounding exercise",
    "Play some calming sounds for me",
];

pub fn opening_line(age_group: Option<AgeGroup>) -> &'static str {
    match age_group {
        Some(AgeGroup::LateTeen) => LATE_TEEN_OPENING,
        Some(AgeGroup::YoungAdult) => YOUNG_ADULT_OPENING,
        Some(AgeGroup::EarlyTeen) | None => DEFAULT_OPENING,
    }
}

pub fn tone_clause(tone: TonePreference) -> &'static str {
    match tone {
        TonePreference::Gentle => "I'll keep things gentle and kind.",
        TonePreference::Direct => "I'll be clear and straightforward.",
        TonePreference::Coaching => "I'll coach you through challenges.",
    }
}

/// Opening, tone clause, closing question, then " (pronouns)" when pronouns are set.
pub fn welcome_message(profile: &UserProfile) -> String {
    let mut out = format!(
        "{} {} {}",
        opening_line(profile.age_group),
        tone_clause(profile.tone_preference),
        CLOSING_QUESTION
    );
    if let Some(p) = profile.pronouns() {
        out.push_str(&format!(" ({})", p));
    }
    out
}

/// System instruction sent alongside the raw user text on the remote path.
pub fn tone_framing(profile: &UserProfile) -> String {
    let style = match profile.tone_preference {
        TonePreference::Gentle => "Be gentle, warm, and kind.",
        TonePreference::Direct => "Be clear, brief, and straightforward.",
        TonePreference::Coaching => "Be encouraging and coach them toward one small next step.",
    };
    let audience = match profile.age_group {
        Some(g) => format!("The person you are talking with is aged {}.", g.label()),
        None => "The person you are talking with is a young person.".to_string(),
    };
    let mut framing = format!(
        "You are a supportive mental-wellness companion for young people. {} {} \
         Keep replies short and never give medical advice.",
        audience, style
    );
    if let Some(p) = profile.pronouns() {
        framing.push_str(&format!(" Refer to them using {} pronouns.", p));
    }
    framing
}
