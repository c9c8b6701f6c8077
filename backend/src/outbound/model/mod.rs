//! Survival model adapters.
//!
//! The classifier is an XGBoost JSON export evaluated in-process. Loading
//! happens once at startup; a failed load yields an unavailable handle so the
//! service still starts and predictions degrade to zero.

mod dto;
mod gradient_boosted;

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::{SurvivalModel, UnavailableSurvivalModel};

pub use gradient_boosted::{GradientBoostedModel, ModelLoadError};

/// Load the model at `path`, falling back to an unavailable handle.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
///
/// use locaai::domain::ports::SurvivalModel;
/// use locaai::outbound::model::load_survival_model;
///
/// let model = load_survival_model(Path::new("models/survival.json"));
/// let _ = model.predict_probability(&[0.0; 28]);
/// ```
#[must_use]
pub fn load_survival_model(path: &Path) -> Arc<dyn SurvivalModel> {
    match GradientBoostedModel::load(path) {
        Ok(model) => {
            info!(
                path = %path.display(),
                trees = model.tree_count(),
                num_feature = model.num_feature(),
                "survival model loaded"
            );
            Arc::new(model)
        }
        Err(error) => {
            warn!(path = %path.display(), error = %error, "survival model unavailable");
            Arc::new(UnavailableSurvivalModel::new(error.to_string()))
        }
    }
}
