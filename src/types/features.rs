//! Classifier input and output types.

use std::sync::Arc;

use crate::{MedAssistError, Result};

/// Sparse feature vector over a fixed training vocabulary.
///
/// Entries are kept sorted by column index and never store explicit zeros,
/// so [`nnz`](Self::nnz) is the vocabulary overlap of the input text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    dimension: usize,
    entries: Vec<(usize, f32)>,
}

impl FeatureVector {
    /// Build from `(column, value)` pairs. Zeros are dropped, duplicate columns summed.
    pub fn new(dimension: usize, entries: impl IntoIterator<Item = (usize, f32)>) -> Result<Self> {
        let mut entries: Vec<(usize, f32)> = entries.into_iter().collect();
        if let Some((index, _)) = entries.iter().find(|(index, _)| *index >= dimension) {
            return Err(MedAssistError::Inference(format!(
                "feature index {index} out of range for dimension {dimension}"
            )));
        }
        entries.sort_by_key(|(index, _)| *index);

        let mut merged: Vec<(usize, f32)> = Vec::with_capacity(entries.len());
        for (index, value) in entries {
            match merged.last_mut() {
                Some((last, acc)) if *last == index => *acc += value,
                _ => merged.push((index, value)),
            }
        }
        merged.retain(|(_, value)| *value != 0.0);

        Ok(Self {
            dimension,
            entries: merged,
        })
    }

    /// A vector with no nonzero entries.
    pub fn empty(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    /// Number of nonzero entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Value at `index` (zero when absent).
    pub fn get(&self, index: usize) -> f32 {
        self.entries
            .binary_search_by_key(&index, |(i, _)| *i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Iterate over the nonzero entries in column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.entries.iter().copied()
    }

    /// Scale every entry by `factor`.
    pub(crate) fn scale(&mut self, factor: f32) {
        for (_, value) in &mut self.entries {
            *value *= factor;
        }
    }
}

/// Probability distribution over a classifier's closed label set.
///
/// Probabilities are aligned with `classes`, in the classifier's own order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDistribution {
    classes: Arc<[String]>,
    probabilities: Vec<f32>,
}

impl ClassDistribution {
    pub fn new(classes: Arc<[String]>, probabilities: Vec<f32>) -> Result<Self> {
        if classes.len() != probabilities.len() {
            return Err(MedAssistError::Inference(format!(
                "expected {} probabilities, got {}",
                classes.len(),
                probabilities.len()
            )));
        }
        if classes.is_empty() {
            return Err(MedAssistError::Inference(
                "empty probability distribution".to_string(),
            ));
        }
        Ok(Self {
            classes,
            probabilities,
        })
    }

    /// Highest probability in the distribution.
    pub fn max(&self) -> f32 {
        self.probabilities
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Index of the highest probability; the lowest index wins ties.
    pub fn argmax(&self) -> usize {
        let mut best = 0;
        for (i, p) in self.probabilities.iter().enumerate() {
            if *p > self.probabilities[best] {
                best = i;
            }
        }
        best
    }

    /// Label with the highest probability.
    pub fn top_label(&self) -> &str {
        &self.classes[self.argmax()]
    }

    /// Probability assigned to `label`, if it is a known class.
    pub fn probability_of(&self, label: &str) -> Option<f32> {
        self.classes
            .iter()
            .position(|c| c == label)
            .map(|i| self.probabilities[i])
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }

    /// `(label, probability)` pairs in class order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.classes
            .iter()
            .map(String::as_str)
            .zip(self.probabilities.iter().copied())
    }
}
