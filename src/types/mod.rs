//! Public types for the medassist API.

mod features;
mod prediction;

pub use features::{ClassDistribution, FeatureVector};
pub use prediction::{
    DiseaseGuidance, FALLBACK_MEDICATION, FALLBACK_SEVERITY, PredictionResult, RejectReason,
    UNKNOWN_CONDITION, UNKNOWN_SEVERITY,
};
