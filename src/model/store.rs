//! Process-wide artifact store.
//!
//! Loaded exactly once during startup and then shared behind an `Arc`.
//! Nothing mutates it afterwards, so request handlers read it without locks.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{TextClassifier, TfidfPipeline};
use crate::diagnosis::DiseaseCatalog;
use crate::error::{MedAssistError, Result};

/// Environment variable overriding the default artifact directory.
pub const ARTIFACT_DIR_ENV: &str = "MEDASSIST_ARTIFACT_DIR";

/// Default pipeline file name inside the artifact directory.
pub const MODEL_FILE: &str = "model.json";

/// Default catalog file name inside the artifact directory.
pub const DISEASE_INFO_FILE: &str = "disease_info.json";

/// Locations of the two training artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactPaths {
    /// Fitted text pipeline.
    #[serde(default = "default_model_path")]
    pub model: PathBuf,
    /// Label → severity/medication catalog.
    #[serde(default = "default_disease_info_path")]
    pub disease_info: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self::in_dir(default_artifact_dir())
    }
}

impl ArtifactPaths {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE),
            disease_info: dir.join(DISEASE_INFO_FILE),
        }
    }
}

fn default_artifact_dir() -> PathBuf {
    std::env::var(ARTIFACT_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from(".local/share"))
                .join("medassist")
        })
}

fn default_model_path() -> PathBuf {
    default_artifact_dir().join(MODEL_FILE)
}

fn default_disease_info_path() -> PathBuf {
    default_artifact_dir().join(DISEASE_INFO_FILE)
}

/// Overview of the loaded artifacts.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactSummary {
    pub classifier: String,
    pub classes: usize,
    pub catalog_entries: usize,
    /// Classifier labels the catalog cannot resolve.
    pub unmapped_labels: Vec<String>,
}

/// The immutable model + catalog pair.
pub struct ArtifactStore {
    classifier: Arc<dyn TextClassifier>,
    catalog: DiseaseCatalog,
}

impl std::fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("classifier", &self.classifier.name())
            .field("classes", &self.classifier.classes().len())
            .field("catalog", &self.catalog.len())
            .finish()
    }
}

impl ArtifactStore {
    /// Load and validate both artifacts from disk.
    ///
    /// A missing file is `ArtifactMissing`; an unreadable or invalid one is
    /// `ArtifactInvalid`. Either way the caller must not start serving.
    pub fn load(paths: &ArtifactPaths) -> Result<Self> {
        let pipeline = TfidfPipeline::from_json(&read_artifact(&paths.model)?)
            .map_err(|e| with_path(e, &paths.model))?;
        let catalog = DiseaseCatalog::from_json(&read_artifact(&paths.disease_info)?)
            .map_err(|e| with_path(e, &paths.disease_info))?;

        info!(
            model = %paths.model.display(),
            classifier = pipeline.classifier_kind(),
            vocabulary = pipeline.vocabulary_size(),
            classes = pipeline.classes().len(),
            catalog = catalog.len(),
            "artifacts loaded"
        );

        Ok(Self::new(Arc::new(pipeline), catalog))
    }

    /// Assemble a store from already-built parts.
    pub fn new(classifier: Arc<dyn TextClassifier>, catalog: DiseaseCatalog) -> Self {
        let store = Self {
            classifier,
            catalog,
        };
        if store.catalog.is_empty() {
            warn!("disease info catalog is empty, every diagnosis gets generic guidance");
        }
        for label in store.unmapped_labels() {
            warn!(%label, "classifier label has no disease info entry");
        }
        store
    }

    pub fn classifier(&self) -> &dyn TextClassifier {
        self.classifier.as_ref()
    }

    pub fn catalog(&self) -> &DiseaseCatalog {
        &self.catalog
    }

    /// Classifier labels that fall through to generic guidance.
    pub fn unmapped_labels(&self) -> Vec<&str> {
        self.classifier
            .classes()
            .iter()
            .filter(|label| self.catalog.lookup(label).is_none())
            .map(String::as_str)
            .collect()
    }

    pub fn summary(&self) -> ArtifactSummary {
        ArtifactSummary {
            classifier: self.classifier.name().to_string(),
            classes: self.classifier.classes().len(),
            catalog_entries: self.catalog.len(),
            unmapped_labels: self
                .unmapped_labels()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

fn read_artifact(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(MedAssistError::ArtifactMissing {
            path: path.to_path_buf(),
        });
    }
    fs::read_to_string(path).map_err(|e| {
        MedAssistError::ArtifactInvalid(format!("failed to read {}: {e}", path.display()))
    })
}

fn with_path(err: MedAssistError, path: &Path) -> MedAssistError {
    match err {
        MedAssistError::ArtifactInvalid(msg) => {
            MedAssistError::ArtifactInvalid(format!("{}: {msg}", path.display()))
        }
        other => other,
    }
}
