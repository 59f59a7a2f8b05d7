//! Crisis resources shown by the host when an emergency event fires.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Call,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CrisisResource {
    pub name: &'static str,
    pub contact: &'static str,
    pub description: &'static str,
    pub kind: ContactKind,
    pub available_24_7: bool,
}

impl CrisisResource {
    /// `tel:` URI with digits only; `None` for text-line resources.
    pub fn dial_uri(&self) -> Option<String> {
        match self.kind {
            ContactKind::Call => {
                let digits: String = self.contact.chars().filter(|c| c.is_ascii_digit()).collect();
                Some(format!("tel:{}", digits))
            }
            ContactKind::Text => None,
        }
    }
}

pub const CRISIS_RESOURCES: &[CrisisResource] = &[
    CrisisResource {
        name: "988 Suicide & Crisis Lifeline",
        contact: "988",
        description: "Free, confidential support 24/7",
        kind: ContactKind::Call,
        available_24_7: true,
    },
    CrisisResource {
        name: "Crisis Text Line",
        contact: "Text HOME to 741741",
        description: "Free crisis support via text message",
        kind: ContactKind::Text,
        available_24_7: true,
    },
    CrisisResource {
        name: "Emergency Services",
        contact: "911",
        description: "For immediate medical emergencies",
        kind: ContactKind::Call,
        available_24_7: true,
    },
    CrisisResource {
        name: "Trans Lifeline",
        contact: "877-565-8860",
        description: "Support for transgender individuals",
        kind: ContactKind::Call,
        available_24_7: true,
    },
    CrisisResource {
        name: "LGBTQ National Hotline",
        contact: "1-888-843-4564",
        description: "Support for LGBTQ+ youth and adults",
        kind: ContactKind::Call,
        available_24_7: false,
    },
];

/// The always-available subset, in display order.
pub fn immediate_resources() -> impl Iterator<Item = &'static CrisisResource> {
    CRISIS_RESOURCES.iter().filter(|r| r.available_24_7)
}
