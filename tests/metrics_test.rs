//! Tests for metrics emitted by diagnosis and triage.
//!
//! Uses `metrics_util::debugging::DebuggingRecorder` to capture and assert
//! on emitted metrics without needing a real exporter.

use std::sync::Arc;

use metrics_util::MetricKind;
use metrics_util::debugging::{DebugValue, DebuggingRecorder};

use medassist::telemetry;
use medassist::{
    ArtifactStore, ClassDistribution, Diagnoser, DiseaseCatalog, FeatureVector, GateConfig,
    MedAssistError, Result, TextClassifier, TriageMatcher,
};

// ============================================================================
// Mock classifier
// ============================================================================

struct MockClassifier {
    classes: Arc<[String]>,
    nnz: usize,
}

impl MockClassifier {
    fn new(nnz: usize) -> Self {
        Self {
            classes: Arc::from(vec!["Migraine".to_string(), "Allergy".to_string()]),
            nnz,
        }
    }
}

impl TextClassifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn transform(&self, _text: &str) -> Result<FeatureVector> {
        FeatureVector::new(4, (0..self.nnz).map(|i| (i, 1.0)))
    }

    fn predict_proba(&self, _text: &str) -> Result<ClassDistribution> {
        ClassDistribution::new(Arc::clone(&self.classes), vec![0.9, 0.1])
    }

    fn predict(&self, _text: &str) -> Result<String> {
        Ok("Migraine".to_string())
    }
}

struct FailingClassifier;

impl TextClassifier for FailingClassifier {
    fn name(&self) -> &str {
        "failing"
    }

    fn classes(&self) -> &[String] {
        &[]
    }

    fn transform(&self, _text: &str) -> Result<FeatureVector> {
        Err(MedAssistError::Inference("boom".to_string()))
    }

    fn predict_proba(&self, _text: &str) -> Result<ClassDistribution> {
        Err(MedAssistError::Inference("boom".to_string()))
    }

    fn predict(&self, _text: &str) -> Result<String> {
        Err(MedAssistError::Inference("boom".to_string()))
    }
}

// ============================================================================
// Snapshot type alias for readability
// ============================================================================

type SnapshotVec = Vec<(
    metrics_util::CompositeKey,
    Option<metrics::Unit>,
    Option<metrics::SharedString>,
    DebugValue,
)>;

// ============================================================================
// Helpers
// ============================================================================

fn diagnoser(classifier: impl TextClassifier + 'static) -> Diagnoser {
    let store = ArtifactStore::new(Arc::new(classifier), DiseaseCatalog::default());
    Diagnoser::new(Arc::new(store), GateConfig::default())
}

/// Sum counter values for `name` whose `label` equals `value`.
fn counter_with_label(snapshot: &SnapshotVec, name: &str, label: &str, value: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .filter(|(key, _, _, _)| {
            key.key()
                .labels()
                .any(|l| l.key() == label && l.value() == value)
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Sum all counter values matching a given metric name.
fn counter_total(snapshot: &SnapshotVec, name: &str) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| key.kind() == MetricKind::Counter && key.key().name() == name)
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(v) => *v,
            _ => 0,
        })
        .sum()
}

/// Check if any histogram entries exist for a given metric name.
fn has_histogram(snapshot: &SnapshotVec, name: &str) -> bool {
    snapshot
        .iter()
        .any(|(key, _, _, _)| key.kind() == MetricKind::Histogram && key.key().name() == name)
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn accepted_prediction_records_metrics() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        diagnoser(MockClassifier::new(2)).predict("bad headache")
    });
    assert!(result.is_ok());

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(&snapshot, telemetry::PREDICTIONS_TOTAL, "outcome", "accepted"),
        1
    );
    assert!(
        has_histogram(&snapshot, telemetry::PREDICTION_DURATION_SECONDS),
        "expected a duration histogram entry"
    );
    // Empty catalog: the label falls back to generic guidance.
    assert_eq!(counter_total(&snapshot, telemetry::GUIDANCE_FALLBACK_TOTAL), 1);
}

#[test]
fn rejection_records_reason() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    let result = metrics::with_local_recorder(&recorder, || {
        diagnoser(MockClassifier::new(0)).predict("nothing in the vocabulary here")
    });
    assert!(result.unwrap().is_unknown());

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::PREDICTIONS_TOTAL,
            "outcome",
            "out_of_vocabulary"
        ),
        1
    );
    assert_eq!(counter_total(&snapshot, telemetry::GUIDANCE_FALLBACK_TOTAL), 0);
}

#[test]
fn failures_are_counted() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let d = diagnoser(FailingClassifier);
        assert!(d.predict("headache").is_err());
        assert!(d.predict("   ").is_err());
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(&snapshot, telemetry::PREDICTIONS_TOTAL, "outcome", "error"),
        1
    );
    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::PREDICTIONS_TOTAL,
            "outcome",
            "invalid_input"
        ),
        1
    );
}

#[test]
fn triage_records_category() {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();

    metrics::with_local_recorder(&recorder, || {
        let matcher = TriageMatcher::standard();
        matcher.triage("my chest hurts");
        matcher.triage("heart racing");
        matcher.triage("hello?");
    });

    let snapshot = snapshotter.snapshot().into_vec();

    assert_eq!(
        counter_with_label(
            &snapshot,
            telemetry::TRIAGE_TOTAL,
            "category",
            "cardiovascular"
        ),
        2
    );
    assert_eq!(
        counter_with_label(&snapshot, telemetry::TRIAGE_TOTAL, "category", "unclassified"),
        1
    );
}

#[test]
fn metrics_are_noop_without_recorder() {
    // Verify no panics when no recorder is installed.
    let _result = diagnoser(MockClassifier::new(1)).predict("headache").unwrap();
    TriageMatcher::standard().triage("fire");
}
