//! Model artifacts and the text classification stage.
//!
//! The training collaborator exports a fitted pipeline (`model.json`) and a
//! label-info catalog (`disease_info.json`). Both are loaded once by
//! [`ArtifactStore`] and shared read-only for the life of the process.

pub mod classifier;
pub mod pipeline;
pub mod store;
pub mod vectorizer;

pub use classifier::{Classifier, ClassifierSpec, TreeSpec};
pub use pipeline::{PipelineSpec, TfidfPipeline};
pub use store::{ArtifactPaths, ArtifactStore, ArtifactSummary};
pub use vectorizer::{Norm, TfidfVectorizer, VectorizerSpec};

use crate::Result;
use crate::types::{ClassDistribution, FeatureVector};

/// A fitted text classifier over a closed vocabulary and label set.
///
/// Implementations are immutable after construction; every method is a pure
/// function of its input, so one instance serves all requests concurrently.
pub trait TextClassifier: Send + Sync {
    /// Classifier name for logging/debugging.
    fn name(&self) -> &str;

    /// Known labels, in the classifier's internal order.
    fn classes(&self) -> &[String];

    /// Vectorize text over the training vocabulary.
    fn transform(&self, text: &str) -> Result<FeatureVector>;

    /// Most likely label for `text`.
    fn predict(&self, text: &str) -> Result<String>;

    /// Probability of every known label for `text`.
    fn predict_proba(&self, text: &str) -> Result<ClassDistribution>;
}
