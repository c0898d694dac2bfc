//! Rule-based emergency triage.
//!
//! Rules are checked top to bottom and the first rule with a keyword present
//! anywhere in the lower-cased text decides the reply. Keywords match as
//! plain substrings, so "pain" also fires on "painful". Each call is
//! classified independently; nothing is remembered between calls.

use serde::Serialize;

use crate::telemetry;

/// Emergency category chosen by triage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyCategory {
    Cardiovascular,
    Respiratory,
    Bleeding,
    HeadInjury,
    Burn,
    /// No rule matched.
    Unclassified,
}

impl EmergencyCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            EmergencyCategory::Cardiovascular => "cardiovascular",
            EmergencyCategory::Respiratory => "respiratory",
            EmergencyCategory::Bleeding => "bleeding",
            EmergencyCategory::HeadInjury => "head_injury",
            EmergencyCategory::Burn => "burn",
            EmergencyCategory::Unclassified => "unclassified",
        }
    }
}

/// One keyword group and its canned first-aid reply.
#[derive(Debug, Clone)]
pub struct TriageRule {
    pub category: EmergencyCategory,
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
}

impl TriageRule {
    /// Whether any keyword occurs in already lower-cased `text`.
    pub fn matches(&self, text: &str) -> bool {
        self.keywords.iter().any(|k| text.contains(k))
    }
}

/// Reply to an emergency description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmergencyReply {
    pub category: EmergencyCategory,
    pub reply: &'static str,
}

const CARDIOVASCULAR_REPLY: &str = "This sounds like a cardiovascular emergency. Please remain calm, chew an aspirin if available, and wait for emergency services. Paramedics have been notionally dispatched.";
const RESPIRATORY_REPLY: &str = "If you are having severe difficulty breathing, please sit upright. If you have an inhaler or epipen, use it immediately. Ensure doors are unlocked for first responders.";
const BLEEDING_REPLY: &str = "For severe bleeding, apply firm, direct pressure to the wound using a clean cloth. Do not remove the cloth if it soaks through, add another on top. Keep the injured area elevated.";
const HEAD_INJURY_REPLY: &str = "Stay seated or lay down to prevent a fall. Do not move abruptly. If someone is unconscious, ensure their airway is clear and roll them onto their side.";
const BURN_REPLY: &str = "Move away from the source of the burn. Run cool, not cold, water over the affected area for 10 minutes. Do not pop blisters or apply ice directly.";

/// Holding message when no rule matches.
pub const DEFAULT_REPLY: &str = "I am the Emergency AI Agent. We have registered your call. Please stay on the line and stay calm. An operator will be with you shortly. If you can, tell me more about your symptoms.";

/// Standard rules in priority order.
pub const STANDARD_RULES: &[TriageRule] = &[
    TriageRule {
        category: EmergencyCategory::Cardiovascular,
        keywords: &["heart", "chest", "attack", "pain"],
        reply: CARDIOVASCULAR_REPLY,
    },
    TriageRule {
        category: EmergencyCategory::Respiratory,
        keywords: &["breathe", "choking", "breathing", "asthma"],
        reply: RESPIRATORY_REPLY,
    },
    TriageRule {
        category: EmergencyCategory::Bleeding,
        keywords: &["bleeding", "blood", "cut", "wound"],
        reply: BLEEDING_REPLY,
    },
    TriageRule {
        category: EmergencyCategory::HeadInjury,
        keywords: &["head", "concussion", "dizzy", "faint", "passed out"],
        reply: HEAD_INJURY_REPLY,
    },
    TriageRule {
        category: EmergencyCategory::Burn,
        keywords: &["fire", "burn"],
        reply: BURN_REPLY,
    },
];

/// Ordered first-match-wins rule table.
#[derive(Debug, Clone)]
pub struct TriageMatcher {
    rules: Vec<TriageRule>,
    fallback: &'static str,
}

impl Default for TriageMatcher {
    fn default() -> Self {
        Self::standard()
    }
}

impl TriageMatcher {
    /// The five standard first-aid rules and the default holding message.
    pub fn standard() -> Self {
        Self::new(STANDARD_RULES.to_vec(), DEFAULT_REPLY)
    }

    pub fn new(rules: Vec<TriageRule>, fallback: &'static str) -> Self {
        Self { rules, fallback }
    }

    pub fn rules(&self) -> &[TriageRule] {
        &self.rules
    }

    /// Triage `text`. Total: every input, including empty text, gets a reply.
    pub fn triage(&self, text: &str) -> EmergencyReply {
        let text = text.to_lowercase();
        let reply = self
            .rules
            .iter()
            .find(|rule| rule.matches(&text))
            .map(|rule| EmergencyReply {
                category: rule.category,
                reply: rule.reply,
            })
            .unwrap_or(EmergencyReply {
                category: EmergencyCategory::Unclassified,
                reply: self.fallback,
            });

        metrics::counter!(telemetry::TRIAGE_TOTAL, "category" => reply.category.as_str())
            .increment(1);
        reply
    }

    pub fn classify(&self, text: &str) -> EmergencyCategory {
        self.triage(text).category
    }

    pub fn reply(&self, text: &str) -> &'static str {
        self.triage(text).reply
    }
}

/// Triage with the standard rules.
pub fn triage(text: &str) -> &'static str {
    TriageMatcher::standard().reply(text)
}
