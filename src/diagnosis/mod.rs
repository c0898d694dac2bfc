//! Symptom diagnosis pipeline.
//!
//! ```text
//! text ──► transform ──► vocabulary check ──► predict_proba ──► confidence check
//!                              │                                      │
//!                              ▼ reject                               ▼ accept
//!                      "Unknown Condition"          predict ──► catalog resolve
//! ```

pub mod catalog;
pub mod gate;

pub use catalog::{DiseaseCatalog, DiseaseInfo};
pub use gate::{ConfidenceGate, GateConfig, GateDecision, token_count};

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, instrument};

use crate::model::ArtifactStore;
use crate::telemetry;
use crate::types::{DiseaseGuidance, PredictionResult, RejectReason};
use crate::{MedAssistError, Result};

enum Outcome {
    Accepted {
        disease: String,
        guidance: DiseaseGuidance,
    },
    Rejected(RejectReason),
}

/// Turns symptom text into a gated, guidance-enriched diagnosis.
///
/// Holds the shared artifacts by reference count; cloning is cheap and every
/// clone reads the same immutable model.
#[derive(Clone)]
pub struct Diagnoser {
    artifacts: Arc<ArtifactStore>,
    gate: ConfidenceGate,
}

impl Diagnoser {
    pub fn new(artifacts: Arc<ArtifactStore>, gate: GateConfig) -> Self {
        Self {
            artifacts,
            gate: ConfidenceGate::new(gate),
        }
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn gate(&self) -> &ConfidenceGate {
        &self.gate
    }

    /// Diagnose `text`.
    ///
    /// Blank text is an `InvalidInput` error. Untrustworthy predictions are
    /// not errors: they come back as an "Unknown Condition" result.
    #[instrument(skip_all, fields(classifier = self.artifacts.classifier().name()))]
    pub fn predict(&self, text: &str) -> Result<PredictionResult> {
        let start = Instant::now();
        let outcome = self.run(text);

        let label = match &outcome {
            Ok(Outcome::Accepted { .. }) => "accepted",
            Ok(Outcome::Rejected(reason)) => reason.as_str(),
            Err(MedAssistError::InvalidInput(_)) => "invalid_input",
            Err(_) => "error",
        };
        metrics::counter!(telemetry::PREDICTIONS_TOTAL, "outcome" => label).increment(1);
        metrics::histogram!(telemetry::PREDICTION_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());

        Ok(match outcome? {
            Outcome::Accepted { disease, guidance } => {
                PredictionResult::diagnosed(disease, guidance)
            }
            Outcome::Rejected(reason) => PredictionResult::unknown(reason),
        })
    }

    fn run(&self, text: &str) -> Result<Outcome> {
        if text.trim().is_empty() {
            return Err(MedAssistError::InvalidInput(
                "Symptom text cannot be empty.".to_string(),
            ));
        }

        let classifier = self.artifacts.classifier();

        let features = classifier.transform(text)?;
        if let GateDecision::Reject(reason) = self.gate.check_vocabulary(&features, text) {
            debug!(tokens = token_count(text), "rejected: no vocabulary overlap");
            return Ok(Outcome::Rejected(reason));
        }

        let distribution = classifier.predict_proba(text)?;
        if let GateDecision::Reject(reason) = self.gate.check_confidence(&distribution) {
            debug!(max_probability = distribution.max(), "rejected: low confidence");
            return Ok(Outcome::Rejected(reason));
        }

        let disease = classifier.predict(text)?;
        let guidance = match self.artifacts.catalog().lookup(&disease) {
            Some(info) => DiseaseGuidance::from(info),
            None => {
                metrics::counter!(telemetry::GUIDANCE_FALLBACK_TOTAL).increment(1);
                DiseaseGuidance::fallback()
            }
        };
        debug!(
            %disease,
            nnz = features.nnz(),
            max_probability = distribution.max(),
            "accepted"
        );

        Ok(Outcome::Accepted { disease, guidance })
    }
}
