//! Fitted vectorizer + classifier pipeline.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Deserialize;

use super::classifier::{Classifier, ClassifierSpec};
use super::vectorizer::{TfidfVectorizer, VectorizerSpec};
use super::TextClassifier;
use crate::error::{MedAssistError, Result};
use crate::types::{ClassDistribution, FeatureVector};

/// Serialized pipeline artifact (`model.json`).
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineSpec {
    pub vectorizer: VectorizerSpec,
    pub classifier: ClassifierSpec,
}

/// TF-IDF vectorizer followed by a probabilistic classifier.
#[derive(Debug, Clone)]
pub struct TfidfPipeline {
    vectorizer: TfidfVectorizer,
    classifier: Classifier,
    classes: Arc<[String]>,
}

impl TfidfPipeline {
    /// Validate and assemble a pipeline from its serialized form.
    pub fn from_spec(spec: PipelineSpec) -> Result<Self> {
        let classes: Arc<[String]> = spec.classifier.classes().iter().cloned().collect();
        if classes.is_empty() {
            return Err(MedAssistError::ArtifactInvalid(
                "classifier has no classes".to_string(),
            ));
        }
        if classes.iter().any(|c| c.trim().is_empty()) {
            return Err(MedAssistError::ArtifactInvalid(
                "classifier has a blank class label".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = classes.iter().find(|c| !seen.insert(c.as_str())) {
            return Err(MedAssistError::ArtifactInvalid(format!(
                "duplicate class label {dup:?}"
            )));
        }

        let vectorizer = TfidfVectorizer::from_spec(spec.vectorizer)?;
        let classifier = Classifier::from_spec(spec.classifier, vectorizer.dimension())?;

        Ok(Self {
            vectorizer,
            classifier,
            classes,
        })
    }

    /// Parse and validate a pipeline from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: PipelineSpec = serde_json::from_str(json)
            .map_err(|e| MedAssistError::ArtifactInvalid(format!("malformed pipeline: {e}")))?;
        Self::from_spec(spec)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.dimension()
    }

    pub fn classifier_kind(&self) -> &'static str {
        self.classifier.kind_name()
    }
}

impl TextClassifier for TfidfPipeline {
    fn name(&self) -> &str {
        "tfidf"
    }

    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn transform(&self, text: &str) -> Result<FeatureVector> {
        self.vectorizer.transform(text)
    }

    fn predict(&self, text: &str) -> Result<String> {
        let distribution = self.predict_proba(text)?;
        Ok(distribution.top_label().to_string())
    }

    fn predict_proba(&self, text: &str) -> Result<ClassDistribution> {
        let features = self.vectorizer.transform(text)?;
        let probabilities = self.classifier.predict_proba(&features)?;
        ClassDistribution::new(Arc::clone(&self.classes), probabilities)
    }
}
