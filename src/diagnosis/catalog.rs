//! Disease info catalog with fuzzy label resolution.
//!
//! Classifier labels and curated catalog names can differ in casing or carry
//! extra descriptors ("Urinary Tract Infection" vs "urinary tract infection").
//! A label matches a catalog name when either one, lower-cased, contains the
//! other. Entries are tried in catalog order and the first match wins.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MedAssistError, Result};
use crate::types::DiseaseGuidance;

/// One curated catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    pub disease: String,
    pub severity: String,
    #[serde(default)]
    pub medications: Vec<String>,
}

impl From<&DiseaseInfo> for DiseaseGuidance {
    fn from(info: &DiseaseInfo) -> Self {
        Self {
            severity: info.severity.clone(),
            medications: info.medications.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    info: DiseaseInfo,
}

/// Ordered, validated label → guidance mapping.
#[derive(Debug, Clone, Default)]
pub struct DiseaseCatalog {
    entries: Vec<Entry>,
}

impl DiseaseCatalog {
    /// Validate entries and precompute their lower-cased keys.
    ///
    /// Blank and duplicate names (ignoring case and surrounding whitespace)
    /// are rejected. Names nested inside other names are kept, since the
    /// resolver tolerates them, but they make catalog order significant.
    pub fn new(entries: Vec<DiseaseInfo>) -> Result<Self> {
        let mut seen = HashSet::new();
        for info in &entries {
            let normalized = info.disease.trim().to_lowercase();
            if normalized.is_empty() {
                return Err(MedAssistError::ArtifactInvalid(
                    "disease info entry has a blank name".to_string(),
                ));
            }
            if !seen.insert(normalized) {
                return Err(MedAssistError::ArtifactInvalid(format!(
                    "duplicate disease info entry {:?}",
                    info.disease
                )));
            }
        }

        let entries: Vec<Entry> = entries
            .into_iter()
            .map(|info| Entry {
                key: info.disease.trim().to_lowercase(),
                info,
            })
            .collect();

        for (i, outer) in entries.iter().enumerate() {
            for inner in &entries[i + 1..] {
                if outer.key.contains(&inner.key) || inner.key.contains(&outer.key) {
                    warn!(
                        first = %outer.info.disease,
                        second = %inner.info.disease,
                        "overlapping disease info names, earlier entry wins"
                    );
                }
            }
        }

        Ok(Self { entries })
    }

    /// Parse a JSON array of entries.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<DiseaseInfo> = serde_json::from_str(json).map_err(|e| {
            MedAssistError::ArtifactInvalid(format!("malformed disease info: {e}"))
        })?;
        Self::new(entries)
    }

    /// First entry whose name contains, or is contained in, `label` (case-insensitive).
    pub fn lookup(&self, label: &str) -> Option<&DiseaseInfo> {
        let label = label.to_lowercase();
        self.entries
            .iter()
            .find(|e| label.contains(&e.key) || e.key.contains(&label))
            .map(|e| &e.info)
    }

    /// Guidance for `label`, or the generic fallback when nothing matches.
    pub fn resolve(&self, label: &str) -> DiseaseGuidance {
        self.lookup(label)
            .map(DiseaseGuidance::from)
            .unwrap_or_else(DiseaseGuidance::fallback)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in resolution order.
    pub fn iter(&self) -> impl Iterator<Item = &DiseaseInfo> + '_ {
        self.entries.iter().map(|e| &e.info)
    }
}
