//! Confidence gate for classifier output.
//!
//! Two rules, applied in order:
//! 1. An input longer than `oov_max_tokens` words that shares no term with
//!    the training vocabulary is rejected as out of vocabulary. Shorter
//!    inputs pass this rule even with no overlap.
//! 2. A prediction whose highest class probability is below
//!    `min_confidence` is rejected as low confidence.

use serde::Deserialize;

use crate::error::{MedAssistError, Result};
use crate::types::{ClassDistribution, FeatureVector, RejectReason};

/// Tunable gate thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GateConfig {
    /// Lowest acceptable top-class probability (default: 0.12).
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    /// Longest input, in words, allowed through with no vocabulary overlap (default: 2).
    #[serde(default = "default_oov_max_tokens")]
    pub oov_max_tokens: usize,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            oov_max_tokens: default_oov_max_tokens(),
        }
    }
}

fn default_min_confidence() -> f32 {
    0.12
}

fn default_oov_max_tokens() -> usize {
    2
}

impl GateConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(MedAssistError::Configuration(format!(
                "gate.min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

/// Gate verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Accept,
    Reject(RejectReason),
}

/// Applies [`GateConfig`] to classifier output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceGate {
    config: GateConfig,
}

impl ConfidenceGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Rule 1: vocabulary overlap.
    pub fn check_vocabulary(&self, features: &FeatureVector, text: &str) -> GateDecision {
        if features.nnz() == 0 && token_count(text) > self.config.oov_max_tokens {
            GateDecision::Reject(RejectReason::OutOfVocabulary)
        } else {
            GateDecision::Accept
        }
    }

    /// Rule 2: top-class probability.
    pub fn check_confidence(&self, distribution: &ClassDistribution) -> GateDecision {
        if distribution.max() < self.config.min_confidence {
            GateDecision::Reject(RejectReason::LowConfidence)
        } else {
            GateDecision::Accept
        }
    }

    /// Both rules in order.
    pub fn evaluate(
        &self,
        features: &FeatureVector,
        text: &str,
        distribution: &ClassDistribution,
    ) -> GateDecision {
        match self.check_vocabulary(features, text) {
            GateDecision::Accept => self.check_confidence(distribution),
            reject => reject,
        }
    }
}

/// Whitespace-separated word count.
pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}
