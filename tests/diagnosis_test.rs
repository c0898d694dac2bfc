//! Diagnosis pipeline tests against a stub classifier.
//!
//! The stub returns a fixed feature vector and distribution so each gate
//! rule can be driven independently of a trained model.

use std::sync::Arc;

use medassist::diagnosis::DiseaseInfo;
use medassist::{
    ArtifactStore, ClassDistribution, Diagnoser, DiseaseCatalog, FeatureVector, GateConfig,
    MedAssistError, Result, TextClassifier, UNKNOWN_CONDITION,
};

// ============================================================================
// Stub classifier
// ============================================================================

struct StubClassifier {
    classes: Arc<[String]>,
    /// Non-zero feature count reported for every input.
    nnz: usize,
    probabilities: Vec<f32>,
    fail: bool,
}

impl StubClassifier {
    fn new(classes: &[&str], nnz: usize, probabilities: Vec<f32>) -> Self {
        Self {
            classes: classes.iter().map(|c| c.to_string()).collect(),
            nnz,
            probabilities,
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&["Migraine"], 1, vec![1.0])
        }
    }
}

impl TextClassifier for StubClassifier {
    fn name(&self) -> &str {
        "stub"
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn transform(&self, _text: &str) -> Result<FeatureVector> {
        if self.fail {
            return Err(MedAssistError::Inference("vectorizer exploded".to_string()));
        }
        FeatureVector::new(16, (0..self.nnz).map(|i| (i, 0.5)))
    }

    fn predict_proba(&self, _text: &str) -> Result<ClassDistribution> {
        ClassDistribution::new(Arc::clone(&self.classes), self.probabilities.clone())
    }

    fn predict(&self, text: &str) -> Result<String> {
        Ok(self.predict_proba(text)?.top_label().to_string())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn catalog() -> DiseaseCatalog {
    DiseaseCatalog::new(vec![
        DiseaseInfo {
            disease: "Migraine".to_string(),
            severity: "Moderate".to_string(),
            medications: vec!["Triptans".to_string(), "Pain relievers".to_string()],
        },
        DiseaseInfo {
            disease: "allergy".to_string(),
            severity: "Mild".to_string(),
            medications: vec!["Antihistamines".to_string(), "Avoid allergens".to_string()],
        },
    ])
    .unwrap()
}

fn diagnoser(classifier: StubClassifier) -> Diagnoser {
    diagnoser_with_gate(classifier, GateConfig::default())
}

fn diagnoser_with_gate(classifier: StubClassifier, gate: GateConfig) -> Diagnoser {
    let store = ArtifactStore::new(Arc::new(classifier), catalog());
    Diagnoser::new(Arc::new(store), gate)
}

// ============================================================================
// Accepted predictions
// ============================================================================

#[test]
fn confident_prediction_carries_catalog_guidance() {
    let d = diagnoser(StubClassifier::new(
        &["Allergy", "Heart Attack", "Migraine"],
        3,
        vec![0.1, 0.2, 0.7],
    ));

    let result = d.predict("I have a bad headache and fever").unwrap();
    assert_eq!(result.disease, "Migraine");
    assert_eq!(result.severity.as_deref(), Some("Moderate"));
    assert_eq!(
        result.medications,
        Some(vec!["Triptans".to_string(), "Pain relievers".to_string()])
    );
    assert!(result.error.is_none());
    assert!(!result.is_unknown());
}

#[test]
fn catalog_lookup_ignores_case() {
    let d = diagnoser(StubClassifier::new(&["Allergy", "Migraine"], 2, vec![0.8, 0.2]));

    let result = d.predict("my skin is very itchy").unwrap();
    assert_eq!(result.disease, "Allergy");
    assert_eq!(result.severity.as_deref(), Some("Mild"));
}

#[test]
fn unmapped_label_gets_generic_guidance() {
    let d = diagnoser(StubClassifier::new(
        &["Heart Attack", "Migraine"],
        2,
        vec![0.9, 0.1],
    ));

    let result = d.predict("chest pain radiating to my arm").unwrap();
    assert_eq!(result.disease, "Heart Attack");
    assert_eq!(result.severity.as_deref(), Some("Consult Doctor"));
    assert_eq!(
        result.medications,
        Some(vec!["Seek medical advice".to_string()])
    );
}

#[test]
fn probability_exactly_at_threshold_is_accepted() {
    let gate = GateConfig {
        min_confidence: 0.5,
        ..GateConfig::default()
    };
    let d = diagnoser_with_gate(StubClassifier::new(&["Allergy", "Migraine"], 1, vec![0.5, 0.5]), gate);

    let result = d.predict("sneezing").unwrap();
    // Ties go to the first class.
    assert_eq!(result.disease, "Allergy");
}

// ============================================================================
// Gate rejections
// ============================================================================

#[test]
fn long_input_without_vocabulary_is_rejected() {
    let d = diagnoser(StubClassifier::new(&["Migraine"], 0, vec![1.0]));

    let result = d.predict("what a lovely sunny day outside").unwrap();
    assert_eq!(result.disease, UNKNOWN_CONDITION);
    assert_eq!(result.severity.as_deref(), Some("Unknown"));
    assert_eq!(result.medications, Some(Vec::new()));
    assert_eq!(
        result.error.as_deref(),
        Some("The symptoms provided do not match enough known medical terms in our database. Please type your correct symptoms.")
    );
    assert!(result.is_unknown());
}

#[test]
fn short_input_without_vocabulary_passes_first_rule() {
    let d = diagnoser(StubClassifier::new(&["Allergy", "Migraine"], 0, vec![0.6, 0.4]));

    let result = d.predict("achy knees").unwrap();
    assert_eq!(result.disease, "Allergy");
    assert!(result.error.is_none());
}

#[test]
fn oov_token_limit_is_configurable() {
    let gate = GateConfig {
        oov_max_tokens: 0,
        ..GateConfig::default()
    };
    let d = diagnoser_with_gate(StubClassifier::new(&["Migraine"], 0, vec![1.0]), gate);

    let result = d.predict("zzz").unwrap();
    assert!(result.is_unknown());
}

#[test]
fn low_confidence_is_rejected() {
    // Ten classes, flat distribution: max 0.10 < 0.12.
    let classes: Vec<String> = (0..10).map(|i| format!("Condition {i}")).collect();
    let class_refs: Vec<&str> = classes.iter().map(String::as_str).collect();
    let d = diagnoser(StubClassifier::new(&class_refs, 4, vec![0.1; 10]));

    let result = d.predict("some vague discomfort somewhere").unwrap();
    assert_eq!(result.disease, UNKNOWN_CONDITION);
    assert_eq!(
        result.error.as_deref(),
        Some("We could not confidently determine a diagnosis from these symptoms. Please provide more medical details.")
    );
}

#[test]
fn unknown_result_serializes_all_fields() {
    let d = diagnoser(StubClassifier::new(&["Migraine"], 0, vec![1.0]));

    let result = d.predict("nothing here matches at all").unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["disease"], "Unknown Condition");
    assert_eq!(json["severity"], "Unknown");
    assert_eq!(json["medications"], serde_json::json!([]));
    assert!(json["error"].is_string());
}

#[test]
fn accepted_result_omits_error_field() {
    let d = diagnoser(StubClassifier::new(&["Migraine"], 1, vec![1.0]));

    let json = serde_json::to_value(d.predict("headache").unwrap()).unwrap();
    assert!(json.get("error").is_none());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn blank_text_is_invalid_input() {
    let d = diagnoser(StubClassifier::new(&["Migraine"], 1, vec![1.0]));

    for text in ["", "   ", "\n\t"] {
        let err = d.predict(text).unwrap_err();
        assert!(matches!(err, MedAssistError::InvalidInput(_)), "{text:?}");
        assert_eq!(err.status_code(), 400);
    }
}

#[test]
fn classifier_failure_surfaces_as_internal_error() {
    let d = diagnoser(StubClassifier::failing());

    let err = d.predict("headache").unwrap_err();
    assert!(matches!(err, MedAssistError::Inference(_)));
    assert_eq!(err.status_code(), 500);
    assert!(err.to_string().contains("vectorizer exploded"));
}

#[test]
fn diagnoser_clones_share_artifacts() {
    let d = diagnoser(StubClassifier::new(&["Migraine"], 1, vec![1.0]));
    let clone = d.clone();

    assert!(std::ptr::eq(d.artifacts(), clone.artifacts()));
    assert_eq!(
        d.predict("headache").unwrap(),
        clone.predict("headache").unwrap()
    );
}
