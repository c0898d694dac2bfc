//! Telemetry metric name constants.
//!
//! Centralised metric names for medassist operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `medassist_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `outcome`: how a prediction request ended: "accepted",
//!   "out_of_vocabulary", "low_confidence", "invalid_input" or "error"
//! - `category`: emergency category chosen by triage (e.g. "cardiovascular")

/// Total diagnostic prediction requests.
///
/// Labels: `outcome`.
pub const PREDICTIONS_TOTAL: &str = "medassist_predictions_total";

/// Prediction duration in seconds, including gating and resolution.
pub const PREDICTION_DURATION_SECONDS: &str = "medassist_prediction_duration_seconds";

/// Accepted diagnoses whose label had no catalog entry.
pub const GUIDANCE_FALLBACK_TOTAL: &str = "medassist_guidance_fallback_total";

/// Total emergency triage requests.
///
/// Labels: `category`.
pub const TRIAGE_TOTAL: &str = "medassist_triage_total";
