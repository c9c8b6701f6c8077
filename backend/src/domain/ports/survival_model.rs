//! Driven port for the pre-trained survival classifier.
//!
//! Inference is CPU-only and pure, so the port is synchronous. Handles are
//! shared read-only across requests.

use super::define_port_error;

define_port_error! {
    /// Errors raised by a survival model handle.
    pub enum SurvivalModelError {
        /// No model is loaded.
        Unavailable { message: String } =>
            "survival model unavailable: {message}",
        /// The vector length does not match the model input shape.
        FeatureCount { expected: usize, actual: usize } =>
            "model expects {expected} features, got {actual}",
        /// The model artefact is inconsistent (bad node index, empty forest).
        Inference { message: String } =>
            "survival model inference failed: {message}",
    }
}

/// Binary classifier estimating long-term survival.
#[cfg_attr(test, mockall::automock)]
pub trait SurvivalModel: Send + Sync {
    /// Probability of the positive (survives) class, in `[0, 1]`.
    fn predict_probability(&self, features: &[f64]) -> Result<f64, SurvivalModelError>;
}

/// Handle used when no model could be loaded at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailableSurvivalModel {
    reason: String,
}

impl UnavailableSurvivalModel {
    /// Record why loading failed.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SurvivalModel for UnavailableSurvivalModel {
    fn predict_probability(&self, _features: &[f64]) -> Result<f64, SurvivalModelError> {
        Err(SurvivalModelError::unavailable(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn unavailable_model_always_fails() {
        let model = UnavailableSurvivalModel::new("model.json missing");
        let err = model
            .predict_probability(&[0.0; 28])
            .expect_err("no model loaded");
        assert_eq!(
            err.to_string(),
            "survival model unavailable: model.json missing"
        );
    }
}
