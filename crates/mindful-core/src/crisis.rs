//! Crisis Classifier: substring scan for self-harm and suicide phrases.
//!
//! Matching is plain case-folded containment. It is not word-boundary aware, so
//! "give up" also fires on "I want to give up on my diet". That false positive is
//! kept on purpose; tests pin it as a boundary case.

/// Canonical crisis phrases (lowercase). A classifier may extend this set, never shrink it.
pub const CRISIS_PATTERNS: &[&str] = &[
    "hurt myself",
    "suicide",
    "suicidal",
    "end it all",
    "kill myself",
    "better off dead",
    "give up",
    "self harm",
    "self-harm",
    "overdose",
    "end my life",
];

/// Classify with the canonical pattern set.
pub fn classify(text: &str) -> bool {
    let lower = text.to_lowercase();
    CRISIS_PATTERNS.iter().any(|p| lower.contains(p))
}

/// Ordered crisis pattern table. Always contains [`CRISIS_PATTERNS`].
#[derive(Debug, Clone)]
pub struct CrisisClassifier {
    patterns: Vec<String>,
}

impl Default for CrisisClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl CrisisClassifier {
    pub fn new() -> Self {
        Self {
            patterns: CRISIS_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Canonical set plus `extra` phrases. Extras are lowercased, trimmed, and deduplicated.
    pub fn with_extra_patterns<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classifier = Self::new();
        for p in extra {
            let p = p.as_ref().trim().to_lowercase();
            if !p.is_empty() && !classifier.patterns.contains(&p) {
                classifier.patterns.push(p);
            }
        }
        classifier
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn classify(&self, text: &str) -> bool {
        self.matched_pattern(text).is_some()
    }

    /// First pattern (in table order) contained in the case-folded text.
    pub fn matched_pattern(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.patterns
            .iter()
            .find(|p| lower.contains(p.as_str()))
            .map(String::as_str)
    }
}
