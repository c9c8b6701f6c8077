//! In-process evaluation of an XGBoost `binary:logistic` tree ensemble.
//!
//! The margin is the sum of one leaf per tree plus the logit of
//! `base_score`; the probability is its logistic transform. A split sends a
//! sample left when `x < threshold`, compared in `f32` as XGBoost does, and
//! NaN follows the split's default direction.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use thiserror::Error;

use super::dto::{ModelDocumentDto, TreeDto, parse_scalar};
use crate::domain::ports::{SurvivalModel, SurvivalModelError};

const SUPPORTED_OBJECTIVES: [&str; 2] = ["binary:logistic", "reg:logistic"];

/// Errors raised while loading a model export.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    /// The file could not be read.
    #[error("failed to read model at {path}: {source}")]
    Read {
        /// Model path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not a well-formed model export.
    #[error("invalid model document: {message}")]
    Decode {
        /// Description of the defect.
        message: String,
    },
    /// The export uses a booster or objective this evaluator cannot run.
    #[error("unsupported model: {message}")]
    Unsupported {
        /// Description of the unsupported feature.
        message: String,
    },
}

impl ModelLoadError {
    fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
        default_left: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_dto(index: usize, dto: TreeDto, num_feature: usize) -> Result<Self, ModelLoadError> {
        let len = dto.left_children.len();
        if [
            dto.right_children.len(),
            dto.split_indices.len(),
            dto.split_conditions.len(),
            dto.default_left.len(),
        ]
        .iter()
        .any(|other| *other != len)
        {
            return Err(ModelLoadError::decode(format!(
                "tree {index} has node arrays of differing lengths"
            )));
        }
        if len == 0 {
            return Err(ModelLoadError::decode(format!("tree {index} has no nodes")));
        }

        let mut nodes = Vec::with_capacity(len);
        for node in 0..len {
            let left = dto.left_children[node];
            if left < 0 {
                nodes.push(Node::Leaf(f64::from(dto.split_conditions[node])));
                continue;
            }
            let child = |raw: i64| {
                usize::try_from(raw)
                    .ok()
                    .filter(|child| *child > node && *child < len)
                    .ok_or_else(|| {
                        ModelLoadError::decode(format!(
                            "tree {index} node {node} has invalid child {raw}"
                        ))
                    })
            };
            let feature = usize::try_from(dto.split_indices[node])
                .ok()
                .filter(|feature| *feature < num_feature)
                .ok_or_else(|| {
                    ModelLoadError::decode(format!(
                        "tree {index} node {node} splits on feature {} outside 0..{num_feature}",
                        dto.split_indices[node]
                    ))
                })?;
            nodes.push(Node::Split {
                feature,
                threshold: dto.split_conditions[node],
                left: child(left)?,
                right: child(dto.right_children[node])?,
                default_left: dto.default_left[node].is_set(),
            });
        }
        Ok(Self { nodes })
    }

    /// Children always follow their parent, so the walk terminates.
    fn leaf_value(&self, features: &[f64]) -> Result<f64, SurvivalModelError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(Node::Leaf(value)) => return Ok(*value),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                }) => {
                    let value = as_split_input(features.get(*feature).copied().unwrap_or(f64::NAN));
                    let go_left = if value.is_nan() {
                        *default_left
                    } else {
                        value < *threshold
                    };
                    index = if go_left { *left } else { *right };
                }
                None => {
                    return Err(SurvivalModelError::inference(format!(
                        "node {index} out of range"
                    )));
                }
            }
        }
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "split inputs are rounded to float32 before comparison"
)]
fn as_split_input(value: f64) -> f32 {
    value as f32
}

/// Loaded tree ensemble.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostedModel {
    num_feature: usize,
    base_margin: f64,
    trees: Vec<Tree>,
}

impl GradientBoostedModel {
    /// Read and validate a JSON export from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ModelLoadError`] when the file is unreadable, malformed or
    /// uses an unsupported booster/objective.
    pub fn load(path: &Path) -> Result<Self, ModelLoadError> {
        let read_error = |source| ModelLoadError::Read {
            path: path.to_path_buf(),
            source,
        };
        let parent = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            read_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "model path must be a file",
            ))
        })?;
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let payload = dir.read(Path::new(file_name)).map_err(read_error)?;
        Self::from_json_slice(&payload)
    }

    /// Parse and validate an in-memory JSON export.
    ///
    /// # Errors
    ///
    /// Returns [`ModelLoadError`] for malformed or unsupported documents.
    pub fn from_json_slice(payload: &[u8]) -> Result<Self, ModelLoadError> {
        let document: ModelDocumentDto = serde_json::from_slice(payload)
            .map_err(|error| ModelLoadError::decode(error.to_string()))?;
        let learner = document.learner;

        if !SUPPORTED_OBJECTIVES.contains(&learner.objective.name.as_str()) {
            return Err(ModelLoadError::unsupported(format!(
                "objective {}",
                learner.objective.name
            )));
        }
        if learner.gradient_booster.name != "gbtree" {
            return Err(ModelLoadError::unsupported(format!(
                "booster {}",
                learner.gradient_booster.name
            )));
        }
        let params = learner.learner_model_param;
        let num_class = params
            .num_class
            .as_deref()
            .and_then(parse_scalar)
            .unwrap_or(0.0);
        if num_class > 1.0 {
            return Err(ModelLoadError::unsupported(format!(
                "{num_class} classes; only binary models are supported"
            )));
        }
        let num_feature = params
            .num_feature
            .trim()
            .parse::<usize>()
            .map_err(|error| ModelLoadError::decode(format!("num_feature: {error}")))?;
        let base_score = parse_scalar(&params.base_score)
            .filter(|score| *score > 0.0 && *score < 1.0)
            .ok_or_else(|| {
                ModelLoadError::decode(format!("base_score {:?} is not a probability", params.base_score))
            })?;

        let trees = learner
            .gradient_booster
            .model
            .trees
            .into_iter()
            .enumerate()
            .map(|(index, tree)| Tree::from_dto(index, tree, num_feature))
            .collect::<Result<Vec<_>, _>>()?;
        if trees.is_empty() {
            return Err(ModelLoadError::decode("model contains no trees"));
        }

        Ok(Self {
            num_feature,
            base_margin: (base_score / (1.0 - base_score)).ln(),
            trees,
        })
    }

    /// Input width the model was trained on.
    #[must_use]
    pub fn num_feature(&self) -> usize {
        self.num_feature
    }

    /// Number of boosted trees.
    #[must_use]
    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }
}

impl SurvivalModel for GradientBoostedModel {
    fn predict_probability(&self, features: &[f64]) -> Result<f64, SurvivalModelError> {
        if features.len() != self.num_feature {
            return Err(SurvivalModelError::feature_count(
                self.num_feature,
                features.len(),
            ));
        }
        let mut margin = self.base_margin;
        for tree in &self.trees {
            margin += tree.leaf_value(features)?;
        }
        let probability = 1.0 / (1.0 + (-margin).exp());
        if !probability.is_finite() {
            return Err(SurvivalModelError::inference(format!(
                "non-finite probability from margin {margin}"
            )));
        }
        Ok(probability)
    }
}
