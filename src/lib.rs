//! medassist - symptom diagnosis and emergency triage
//!
//! Two independent cores sit behind a thin transport:
//!
//! - **Diagnosis**: a fitted TF-IDF text classifier produces a label and a
//!   probability distribution; a confidence gate turns untrustworthy output
//!   into an explicit "Unknown Condition" result; accepted labels are
//!   resolved against a curated severity/medication catalog.
//! - **Triage**: an ordered keyword rule table maps an emergency description
//!   to a canned first-aid reply.
//!
//! # Diagnosis Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use medassist::{ArtifactPaths, ArtifactStore, Diagnoser, GateConfig};
//!
//! fn main() -> medassist::Result<()> {
//!     let artifacts = ArtifactStore::load(&ArtifactPaths::in_dir("/srv/medassist"))?;
//!     let diagnoser = Diagnoser::new(Arc::new(artifacts), GateConfig::default());
//!
//!     let result = diagnoser.predict("I have a bad headache and fever")?;
//!     println!("{} ({:?})", result.disease, result.severity);
//!     Ok(())
//! }
//! ```
//!
//! # Triage Example
//!
//! ```rust
//! use medassist::{EmergencyCategory, TriageMatcher};
//!
//! let matcher = TriageMatcher::standard();
//! let reply = matcher.triage("my chest hurts and I am dizzy");
//! assert_eq!(reply.category, EmergencyCategory::Cardiovascular);
//! ```

pub mod diagnosis;
pub mod error;
pub mod model;
pub mod server;
pub mod telemetry;
pub mod triage;
pub mod types;
mod version;

pub use version::{GIT_BRANCH, GIT_SHA, PKG_VERSION, git_dirty, version_string};

// Re-export main types at crate root
pub use diagnosis::{ConfidenceGate, Diagnoser, DiseaseCatalog, DiseaseInfo, GateConfig};
pub use error::{ErrorKind, MedAssistError, Result};
pub use model::{ArtifactPaths, ArtifactStore, TextClassifier, TfidfPipeline};
pub use triage::{EmergencyCategory, EmergencyReply, TriageMatcher, TriageRule};

pub use types::{
    ClassDistribution, DiseaseGuidance, FeatureVector, PredictionResult, RejectReason,
    UNKNOWN_CONDITION,
};
