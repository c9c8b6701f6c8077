//! DTOs for decoding XGBoost JSON model exports.
//!
//! Only the fields needed for tree-walk inference are decoded. Numeric
//! parameters arrive as strings; `base_score` may be wrapped in brackets.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct ModelDocumentDto {
    pub(super) learner: LearnerDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct LearnerDto {
    pub(super) learner_model_param: LearnerModelParamDto,
    pub(super) gradient_booster: GradientBoosterDto,
    pub(super) objective: ObjectiveDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct LearnerModelParamDto {
    pub(super) base_score: String,
    pub(super) num_feature: String,
    #[serde(default)]
    pub(super) num_class: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct GradientBoosterDto {
    pub(super) name: String,
    pub(super) model: GbTreeModelDto,
}

#[derive(Debug, Deserialize)]
pub(super) struct GbTreeModelDto {
    #[serde(default)]
    pub(super) trees: Vec<TreeDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ObjectiveDto {
    pub(super) name: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct TreeDto {
    pub(super) left_children: Vec<i64>,
    pub(super) right_children: Vec<i64>,
    pub(super) split_indices: Vec<i64>,
    /// XGBoost stores thresholds and leaf values as `float32`.
    pub(super) split_conditions: Vec<f32>,
    pub(super) default_left: Vec<FlagDto>,
}

/// Older exports write `default_left` as 0/1, newer ones as booleans.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub(super) enum FlagDto {
    Bool(bool),
    Int(u8),
}

impl FlagDto {
    pub(super) fn is_set(self) -> bool {
        match self {
            Self::Bool(flag) => flag,
            Self::Int(value) => value != 0,
        }
    }
}

/// Parse `"5E-1"` or `"[5E-1]"`.
pub(super) fn parse_scalar(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .parse()
        .ok()
}
