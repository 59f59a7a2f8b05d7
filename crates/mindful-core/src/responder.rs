//! Local keyword responder: an ordered rule table of mood keywords to canned replies.
//!
//! Rules are scanned in priority order and the first hit wins. The first template of
//! each rule is the companion's original reply; the rest are alternates.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoodCategory {
    Anxiety,
    Stress,
    Loneliness,
    Sadness,
    Positivity,
}

impl MoodCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anxiety => "anxiety",
            Self::Stress => "stress",
            Self::Loneliness => "loneliness",
            Self::Sadness => "sadness",
            Self::Positivity => "positivity",
        }
    }
}

/// One row of the rule table.
#[derive(Debug, Clone)]
pub struct LocalRule {
    pub category: MoodCategory,
    pub keywords: &'static [&'static str],
    pub templates: &'static [&'static str],
}

/// Default rules in priority order.
pub const DEFAULT_RULES: &[LocalRule] = &[
    LocalRule {
        category: MoodCategory::Anxiety,
        keywords: &["anxious"],
        templates: &[
            "I hear your anxiety. Let's try this: breathe in for 4, hold for 4, out for 6. Want me to guide you?",
            "Anxiety can make everything feel urgent. Let's slow down together: name five things you can see right now.",
            "That anxious feeling is real, and it will pass. Want to try a short grounding exercise with me?",
        ],
    },
    LocalRule {
        category: MoodCategory::Stress,
        keywords: &["stressed"],
        templates: &[
            "Stress can feel heavy. What's one small thing you could do in the next 10 minutes to ease it?",
            "It sounds like a lot is on your plate. Which part feels the most pressing right now?",
        ],
    },
    LocalRule {
        category: MoodCategory::Loneliness,
        keywords: &["lonely"],
        templates: &[
            "Feeling lonely is really tough. I want you to know I'm here with you right now.",
            "Loneliness can feel so isolating. Is there someone you've felt close to that you could reach out to today?",
        ],
    },
    LocalRule {
        category: MoodCategory::Sadness,
        keywords: &["sad", "down"],
        templates: &[
            "I can feel the sadness in your words. Thank you for sharing. What's been the hardest part of your day?",
            "I'm sorry you're feeling low. You don't have to carry it alone. Want to tell me what's on your mind?",
        ],
    },
    LocalRule {
        category: MoodCategory::Positivity,
        keywords: &["good", "happy"],
        templates: &[
            "That's wonderful! 🌟 What's making you feel this way? Let's celebrate it.",
            "I love hearing that! What's one thing that went well today?",
        ],
    },
];

/// How a template is picked once a rule matches.
#[derive(Debug)]
pub enum TemplateSelection {
    /// Always the first template.
    First,
    /// Uniform choice from a seedable generator.
    Random(Mutex<StdRng>),
}

impl TemplateSelection {
    pub fn seeded(seed: u64) -> Self {
        Self::Random(Mutex::new(StdRng::seed_from_u64(seed)))
    }

    pub fn from_entropy() -> Self {
        Self::Random(Mutex::new(StdRng::from_entropy()))
    }

    fn pick(&self, len: usize) -> usize {
        match self {
            Self::First => 0,
            Self::Random(rng) => {
                let mut rng = rng.lock().unwrap_or_else(|e| e.into_inner());
                rng.gen_range(0..len)
            }
        }
    }
}

/// A canned reply chosen by the local responder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalReply {
    pub category: MoodCategory,
    pub text: &'static str,
}

#[derive(Debug)]
pub struct LocalResponder {
    rules: Vec<LocalRule>,
    selection: TemplateSelection,
}

impl Default for LocalResponder {
    fn default() -> Self {
        Self::new(TemplateSelection::from_entropy())
    }
}

impl LocalResponder {
    pub fn new(selection: TemplateSelection) -> Self {
        Self::with_rules(DEFAULT_RULES.to_vec(), selection)
    }

    /// Custom rule table. Rules with no keywords or no templates never match.
    pub fn with_rules(rules: Vec<LocalRule>, selection: TemplateSelection) -> Self {
        Self { rules, selection }
    }

    /// First matching category, without picking a template.
    pub fn categorize(&self, text: &str) -> Option<MoodCategory> {
        let lower = text.to_lowercase();
        self.match_rule(&lower).map(|r| r.category)
    }

    pub fn respond(&self, text: &str) -> Option<LocalReply> {
        let lower = text.to_lowercase();
        let rule = self.match_rule(&lower)?;
        let idx = self.selection.pick(rule.templates.len());
        Some(LocalReply {
            category: rule.category,
            text: rule.templates[idx],
        })
    }

    fn match_rule(&self, lower: &str) -> Option<&LocalRule> {
        self.rules.iter().find(|r| {
            !r.templates.is_empty() && r.keywords.iter().any(|k| lower.contains(k))
        })
    }
}

/// Templates for a category in the default table (empty if unknown).
pub fn default_templates(category: MoodCategory) -> &'static [&'static str] {
    DEFAULT_RULES
        .iter()
        .find(|r| r.category == category)
        .map(|r| r.templates)
        .unwrap_or(&[])
}
