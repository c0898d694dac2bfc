//! Diagnostic result types

use serde::{Deserialize, Serialize};

/// Sentinel disease label for rejected predictions.
pub const UNKNOWN_CONDITION: &str = "Unknown Condition";

/// Severity reported alongside [`UNKNOWN_CONDITION`].
pub const UNKNOWN_SEVERITY: &str = "Unknown";

/// Severity used when an accepted label has no catalog entry.
pub const FALLBACK_SEVERITY: &str = "Consult Doctor";

/// Medication advice used when an accepted label has no catalog entry.
pub const FALLBACK_MEDICATION: &str = "Seek medical advice";

/// Severity and medication guidance for a diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseGuidance {
    pub severity: String,
    pub medications: Vec<String>,
}

impl DiseaseGuidance {
    /// Generic guidance for labels the catalog does not know.
    pub fn fallback() -> Self {
        Self {
            severity: FALLBACK_SEVERITY.to_string(),
            medications: vec![FALLBACK_MEDICATION.to_string()],
        }
    }
}

/// Why the confidence gate refused a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// No training-vocabulary term in a longer input.
    OutOfVocabulary,
    /// The classifier's best probability fell below the threshold.
    LowConfidence,
}

impl RejectReason {
    /// Caller-facing explanation.
    pub fn message(self) -> &'static str {
        match self {
            RejectReason::OutOfVocabulary => {
                "The symptoms provided do not match enough known medical terms in our database. Please type your correct symptoms."
            }
            RejectReason::LowConfidence => {
                "We could not confidently determine a diagnosis from these symptoms. Please provide more medical details."
            }
        }
    }

    /// Metric label for this reason.
    pub fn as_str(self) -> &'static str {
        match self {
            RejectReason::OutOfVocabulary => "out_of_vocabulary",
            RejectReason::LowConfidence => "low_confidence",
        }
    }
}

/// Structured answer to a diagnostic request.
///
/// `error` is set exactly when `disease` is [`UNKNOWN_CONDITION`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub disease: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medications: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PredictionResult {
    /// An accepted diagnosis with its guidance.
    pub fn diagnosed(disease: impl Into<String>, guidance: DiseaseGuidance) -> Self {
        Self {
            disease: disease.into(),
            severity: Some(guidance.severity),
            medications: Some(guidance.medications),
            error: None,
        }
    }

    /// The soft "Unknown Condition" outcome.
    pub fn unknown(reason: RejectReason) -> Self {
        Self {
            disease: UNKNOWN_CONDITION.to_string(),
            severity: Some(UNKNOWN_SEVERITY.to_string()),
            medications: Some(Vec::new()),
            error: Some(reason.message().to_string()),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.disease == UNKNOWN_CONDITION
    }
}
