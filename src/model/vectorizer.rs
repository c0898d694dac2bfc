//! TF-IDF text vectorization over a fixed training vocabulary.

use std::collections::{HashMap, HashSet};

use regex::Regex;
use serde::Deserialize;

use crate::error::{MedAssistError, Result};
use crate::types::FeatureVector;

/// Default token pattern: words of two or more word characters.
pub const DEFAULT_TOKEN_PATTERN: &str = r"(?u)\b\w\w+\b";

/// Row normalization applied after idf weighting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    #[default]
    L2,
    L1,
    None,
}

/// Serialized vectorizer as exported by training.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorizerSpec {
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f32>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default = "default_token_pattern")]
    pub token_pattern: String,
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default)]
    pub norm: Norm,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_lowercase() -> bool {
    true
}

fn default_token_pattern() -> String {
    DEFAULT_TOKEN_PATTERN.to_string()
}

/// Fitted TF-IDF vectorizer.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f32>,
    min_n: usize,
    max_n: usize,
    lowercase: bool,
    token_pattern: Regex,
    stop_words: HashSet<String>,
    sublinear_tf: bool,
    norm: Norm,
}

impl TfidfVectorizer {
    /// Validate a serialized vectorizer and compile its token pattern.
    pub fn from_spec(spec: VectorizerSpec) -> Result<Self> {
        let (min_n, max_n) = spec.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(MedAssistError::ArtifactInvalid(format!(
                "invalid ngram_range ({min_n}, {max_n})"
            )));
        }
        if spec.vocabulary.is_empty() {
            return Err(MedAssistError::ArtifactInvalid(
                "vectorizer vocabulary is empty".to_string(),
            ));
        }
        if spec.idf.len() != spec.vocabulary.len() {
            return Err(MedAssistError::ArtifactInvalid(format!(
                "idf has {} weights for a vocabulary of {} terms",
                spec.idf.len(),
                spec.vocabulary.len()
            )));
        }
        if let Some((term, index)) = spec
            .vocabulary
            .iter()
            .find(|(_, index)| **index >= spec.idf.len())
        {
            return Err(MedAssistError::ArtifactInvalid(format!(
                "vocabulary term {term:?} has out-of-range index {index}"
            )));
        }

        let token_pattern = Regex::new(&spec.token_pattern).map_err(|e| {
            MedAssistError::ArtifactInvalid(format!("invalid token_pattern: {e}"))
        })?;

        let stop_words = spec
            .stop_words
            .into_iter()
            .map(|w| if spec.lowercase { w.to_lowercase() } else { w })
            .collect();

        Ok(Self {
            vocabulary: spec.vocabulary,
            idf: spec.idf,
            min_n,
            max_n,
            lowercase: spec.lowercase,
            token_pattern,
            stop_words,
            sublinear_tf: spec.sublinear_tf,
            norm: spec.norm,
        })
    }

    /// Number of vocabulary columns.
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    /// Split text into analyzed terms (tokens and n-grams), before vocabulary lookup.
    pub fn analyze(&self, text: &str) -> Vec<String> {
        let text = if self.lowercase {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let tokens: Vec<&str> = self
            .token_pattern
            .find_iter(&text)
            .map(|m| m.as_str())
            .filter(|t| !self.stop_words.contains(*t))
            .collect();

        let mut terms = Vec::new();
        for n in self.min_n..=self.max_n {
            if n > tokens.len() {
                break;
            }
            terms.extend(tokens.windows(n).map(|w| w.join(" ")));
        }
        terms
    }

    /// Vectorize `text` into tf-idf weights over the vocabulary.
    pub fn transform(&self, text: &str) -> Result<FeatureVector> {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for term in self.analyze(text) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let weighted = counts.into_iter().map(|(index, tf)| {
            let tf = if self.sublinear_tf { 1.0 + tf.ln() } else { tf };
            (index, tf * self.idf[index])
        });
        let mut features = FeatureVector::new(self.dimension(), weighted)?;

        let norm = match self.norm {
            Norm::L2 => features.iter().map(|(_, v)| v * v).sum::<f32>().sqrt(),
            Norm::L1 => features.iter().map(|(_, v)| v.abs()).sum(),
            Norm::None => 0.0,
        };
        if norm > 0.0 {
            features.scale(1.0 / norm);
        }
        Ok(features)
    }
}
