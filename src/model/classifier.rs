//! Probabilistic classifiers over tf-idf features.
//!
//! Two exported forms are supported:
//! - `forest`: an ensemble of decision trees in flat array form; class
//!   probabilities are the mean of each tree's normalized leaf distribution.
//! - `linear`: one weight row per class; probabilities are the softmax of the
//!   decision scores.

use serde::Deserialize;

use crate::error::{MedAssistError, Result};
use crate::types::FeatureVector;

/// Leaf marker in `children_left` / `children_right`.
const LEAF: i64 = -1;

/// Serialized classifier as exported by training.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    Forest {
        classes: Vec<String>,
        trees: Vec<TreeSpec>,
    },
    Linear {
        classes: Vec<String>,
        coefficients: Vec<Vec<f32>>,
        intercepts: Vec<f32>,
    },
}

impl ClassifierSpec {
    pub fn classes(&self) -> &[String] {
        match self {
            ClassifierSpec::Forest { classes, .. } | ClassifierSpec::Linear { classes, .. } => {
                classes
            }
        }
    }
}

/// One decision tree, node arrays indexed by node id (root = 0).
#[derive(Debug, Clone, Deserialize)]
pub struct TreeSpec {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        distribution: Vec<f32>,
    },
}

#[derive(Debug, Clone)]
struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    fn from_spec(spec: TreeSpec, n_classes: usize, n_features: usize) -> Result<Self> {
        let n = spec.children_left.len();
        if n == 0 {
            return Err(invalid("tree has no nodes"));
        }
        if spec.children_right.len() != n
            || spec.feature.len() != n
            || spec.threshold.len() != n
            || spec.value.len() != n
        {
            return Err(invalid("tree node arrays have mismatched lengths"));
        }

        let mut nodes = Vec::with_capacity(n);
        for id in 0..n {
            let left = spec.children_left[id];
            let right = spec.children_right[id];
            if left == LEAF || right == LEAF {
                let row = &spec.value[id];
                if row.len() != n_classes {
                    return Err(invalid(&format!(
                        "leaf {id} has {} class weights, expected {n_classes}",
                        row.len()
                    )));
                }
                let total: f64 = row.iter().sum();
                if !(total > 0.0) {
                    return Err(invalid(&format!("leaf {id} has no class weight")));
                }
                let distribution = row.iter().map(|w| (w / total) as f32).collect();
                nodes.push(Node::Leaf { distribution });
                continue;
            }

            // Children always follow their parent, which rules out cycles.
            let in_range = |child: i64| child > id as i64 && (child as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(invalid(&format!("node {id} has invalid children")));
            }
            let feature = spec.feature[id];
            if feature < 0 || feature as usize >= n_features {
                return Err(invalid(&format!(
                    "node {id} splits on unknown feature {feature}"
                )));
            }
            nodes.push(Node::Split {
                feature: feature as usize,
                threshold: spec.threshold[id],
                left: left as usize,
                right: right as usize,
            });
        }
        Ok(Self { nodes })
    }

    fn leaf_distribution(&self, features: &FeatureVector) -> &[f32] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if f64::from(features.get(*feature)) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// A fitted classifier ready for inference.
#[derive(Debug, Clone)]
pub struct Classifier {
    kind: Kind,
    n_features: usize,
}

#[derive(Debug, Clone)]
enum Kind {
    Forest {
        trees: Vec<DecisionTree>,
        n_classes: usize,
    },
    Linear {
        coefficients: Vec<Vec<f32>>,
        intercepts: Vec<f32>,
    },
}

impl Classifier {
    /// Validate a serialized classifier against the vectorizer's dimension.
    pub fn from_spec(spec: ClassifierSpec, n_features: usize) -> Result<Self> {
        match spec {
            ClassifierSpec::Forest { classes, trees } => {
                if trees.is_empty() {
                    return Err(invalid("forest has no trees"));
                }
                let n_classes = classes.len();
                let trees = trees
                    .into_iter()
                    .enumerate()
                    .map(|(i, tree)| {
                        DecisionTree::from_spec(tree, n_classes, n_features).map_err(|e| match e {
                            MedAssistError::ArtifactInvalid(msg) => {
                                invalid(&format!("tree {i}: {msg}"))
                            }
                            other => other,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self {
                    kind: Kind::Forest { trees, n_classes },
                    n_features,
                })
            }
            ClassifierSpec::Linear {
                classes,
                coefficients,
                intercepts,
            } => {
                if coefficients.len() != classes.len() || intercepts.len() != classes.len() {
                    return Err(invalid(&format!(
                        "linear model needs one coefficient row and intercept per class ({})",
                        classes.len()
                    )));
                }
                if let Some(row) = coefficients.iter().position(|r| r.len() != n_features) {
                    return Err(invalid(&format!(
                        "coefficient row {row} does not span {n_features} features"
                    )));
                }
                Ok(Self {
                    kind: Kind::Linear {
                        coefficients,
                        intercepts,
                    },
                    n_features,
                })
            }
        }
    }

    /// Whether this is a tree ensemble or a linear model.
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            Kind::Forest { .. } => "forest",
            Kind::Linear { .. } => "linear",
        }
    }

    /// Class probabilities in class order.
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<Vec<f32>> {
        if features.dimension() != self.n_features {
            return Err(MedAssistError::Inference(format!(
                "classifier expects {} features, got {}",
                self.n_features,
                features.dimension()
            )));
        }
        let probabilities = match &self.kind {
            Kind::Forest { trees, n_classes } => {
                let mut sums = vec![0.0f32; *n_classes];
                for tree in trees {
                    for (acc, p) in sums.iter_mut().zip(tree.leaf_distribution(features)) {
                        *acc += p;
                    }
                }
                let count = trees.len() as f32;
                sums.iter().map(|s| s / count).collect()
            }
            Kind::Linear {
                coefficients,
                intercepts,
            } => {
                let scores: Vec<f32> = coefficients
                    .iter()
                    .zip(intercepts)
                    .map(|(row, b)| features.iter().map(|(i, x)| row[i] * x).sum::<f32>() + b)
                    .collect();
                softmax(&scores)
            }
        };
        Ok(probabilities)
    }
}

/// Softmax function.
fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|x| x / sum).collect()
}

fn invalid(msg: &str) -> MedAssistError {
    MedAssistError::ArtifactInvalid(msg.to_string())
}
