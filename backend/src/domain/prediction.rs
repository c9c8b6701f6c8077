//! Survival prediction with feature-contract fallback.
//!
//! [`SurvivalPredictor`] owns an injected model handle. Under
//! [`ContractPolicy::Auto`] it tries the full vector first and the reduced
//! vector only when the model rejects the full one. When every attempt fails
//! the prediction degrades to probability 0 with no contract recorded.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::feature_vector::{FeatureContract, FeatureSource};
use super::ports::SurvivalModel;

/// Which feature contracts the predictor may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractPolicy {
    /// Full contract, then reduced on failure.
    #[default]
    Auto,
    /// Full contract only.
    Full,
    /// Reduced contract only.
    Reduced,
}

impl ContractPolicy {
    /// Contracts to try, in order.
    #[must_use]
    pub fn contracts(self) -> &'static [FeatureContract] {
        match self {
            Self::Auto => &[FeatureContract::Full, FeatureContract::Reduced],
            Self::Full => &[FeatureContract::Full],
            Self::Reduced => &[FeatureContract::Reduced],
        }
    }
}

/// Error parsing a [`ContractPolicy`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("feature contract policy must be auto, full or reduced, got {0}")]
pub struct ContractPolicyParseError(pub String);

impl FromStr for ContractPolicy {
    type Err = ContractPolicyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "full" => Ok(Self::Full),
            "reduced" => Ok(Self::Reduced),
            _ => Err(ContractPolicyParseError(s.to_owned())),
        }
    }
}

impl fmt::Display for ContractPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Full => "full",
            Self::Reduced => "reduced",
        })
    }
}

/// `round(probability × 100, 1)`.
///
/// # Examples
/// ```
/// use locaai::domain::survival_percentage;
///
/// assert_eq!(survival_percentage(0.73456), 73.5);
/// ```
#[must_use]
pub fn survival_percentage(probability: f64) -> f64 {
    (probability * 1000.0).round() / 10.0
}

/// Model output for one analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurvivalPrediction {
    probability: f64,
    contract: Option<FeatureContract>,
}

impl SurvivalPrediction {
    /// Prediction produced with `contract`; the probability is clamped to `[0, 1]`.
    #[must_use]
    pub fn new(probability: f64, contract: Option<FeatureContract>) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
            contract,
        }
    }

    /// Probability 0 with no contract.
    #[must_use]
    pub fn degraded() -> Self {
        Self::new(0.0, None)
    }

    /// Survival probability in `[0, 1]`.
    #[must_use]
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Probability as a percentage rounded to one decimal.
    #[must_use]
    pub fn percentage(&self) -> f64 {
        survival_percentage(self.probability)
    }

    /// Contract that produced the probability, if the model answered.
    #[must_use]
    pub fn contract(&self) -> Option<FeatureContract> {
        self.contract
    }
}

/// Runs the injected model under a contract policy.
#[derive(Clone)]
pub struct SurvivalPredictor {
    model: Arc<dyn SurvivalModel>,
    policy: ContractPolicy,
}

impl SurvivalPredictor {
    /// Wrap a loaded model handle.
    pub fn new(model: Arc<dyn SurvivalModel>, policy: ContractPolicy) -> Self {
        Self { model, policy }
    }

    /// Predict survival; never fails.
    #[must_use]
    pub fn predict(&self, source: &FeatureSource<'_>) -> SurvivalPrediction {
        for &contract in self.policy.contracts() {
            let features = source.vector(contract);
            match self.model.predict_probability(&features) {
                Ok(probability) if probability.is_finite() => {
                    return SurvivalPrediction::new(probability, Some(contract));
                }
                Ok(probability) => {
                    warn!(%contract, probability, "survival model returned a non-finite probability");
                    return SurvivalPrediction::degraded();
                }
                Err(err) => {
                    warn!(%contract, error = %err, "survival model rejected feature vector");
                }
            }
        }
        warn!(policy = %self.policy, "no feature contract produced a prediction; using 0");
        SurvivalPrediction::degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockSurvivalModel, SurvivalModelError, UnavailableSurvivalModel};
    use crate::domain::{BusinessTypeId, ServiceType, SiteMetrics, StoreArea};
    use mockall::Sequence;
    use rstest::{fixture, rstest};

    #[fixture]
    fn metrics() -> SiteMetrics {
        SiteMetrics::default()
    }

    fn source(metrics: &SiteMetrics) -> FeatureSource<'_> {
        FeatureSource {
            area: StoreArea::new(50.0).expect("valid area"),
            service_type: ServiceType::RestStop,
            business_type_id: BusinessTypeId::new(7).expect("valid id"),
            metrics,
        }
    }

    #[rstest]
    fn full_contract_is_tried_first(metrics: SiteMetrics) {
        let mut model = MockSurvivalModel::new();
        model
            .expect_predict_probability()
            .withf(|features| features.len() == 28)
            .times(1)
            .return_const(Ok(0.8));

        let predictor = SurvivalPredictor::new(Arc::new(model), ContractPolicy::Auto);
        let prediction = predictor.predict(&source(&metrics));

        assert_eq!(prediction.contract(), Some(FeatureContract::Full));
        assert_eq!(prediction.percentage(), 80.0);
    }

    #[rstest]
    fn reduced_contract_only_after_full_fails(metrics: SiteMetrics) {
        let mut model = MockSurvivalModel::new();
        let mut seq = Sequence::new();
        model
            .expect_predict_probability()
            .withf(|features| features.len() == 28)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|features| Err(SurvivalModelError::feature_count(27_usize, features.len())));
        model
            .expect_predict_probability()
            .withf(|features| features.len() == 27)
            .times(1)
            .in_sequence(&mut seq)
            .return_const(Ok(0.61234));

        let predictor = SurvivalPredictor::new(Arc::new(model), ContractPolicy::Auto);
        let prediction = predictor.predict(&source(&metrics));

        assert_eq!(prediction.contract(), Some(FeatureContract::Reduced));
        assert_eq!(prediction.percentage(), 61.2);
    }

    #[rstest]
    fn non_finite_answer_degrades_without_fallback(metrics: SiteMetrics) {
        let mut model = MockSurvivalModel::new();
        model
            .expect_predict_probability()
            .withf(|features| features.len() == 28)
            .times(1)
            .return_const(Ok(f64::NAN));
        model
            .expect_predict_probability()
            .withf(|features| features.len() == 27)
            .never();

        let predictor = SurvivalPredictor::new(Arc::new(model), ContractPolicy::Auto);
        let prediction = predictor.predict(&source(&metrics));

        assert_eq!(prediction.contract(), None);
        assert_eq!(prediction.probability(), 0.0);
    }

    #[rstest]
    #[case(ContractPolicy::Full, 28)]
    #[case(ContractPolicy::Reduced, 27)]
    fn pinned_policy_uses_one_contract(
        metrics: SiteMetrics,
        #[case] policy: ContractPolicy,
        #[case] width: usize,
    ) {
        let mut model = MockSurvivalModel::new();
        model
            .expect_predict_probability()
            .withf(move |features| features.len() == width)
            .times(1)
            .return_const(Err(SurvivalModelError::inference("broken tree")));

        let predictor = SurvivalPredictor::new(Arc::new(model), policy);
        let prediction = predictor.predict(&source(&metrics));

        assert_eq!(prediction, SurvivalPrediction::degraded());
    }

    #[rstest]
    fn unavailable_model_degrades_to_zero(metrics: SiteMetrics) {
        let predictor = SurvivalPredictor::new(
            Arc::new(UnavailableSurvivalModel::new("missing")),
            ContractPolicy::Auto,
        );
        let prediction = predictor.predict(&source(&metrics));
        assert_eq!(prediction.probability(), 0.0);
        assert_eq!(prediction.percentage(), 0.0);
        assert_eq!(prediction.contract(), None);
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(0.123_45, 12.3)]
    #[case(0.999_99, 100.0)]
    #[case(1.0, 100.0)]
    fn percentage_rounds_to_one_decimal(#[case] probability: f64, #[case] expected: f64) {
        assert_eq!(survival_percentage(probability), expected);
    }

    #[rstest]
    #[case("auto", Ok(ContractPolicy::Auto))]
    #[case(" FULL ", Ok(ContractPolicy::Full))]
    #[case("reduced", Ok(ContractPolicy::Reduced))]
    #[case("both", Err(ContractPolicyParseError("both".to_owned())))]
    fn parses_policy(
        #[case] raw: &str,
        #[case] expected: Result<ContractPolicy, ContractPolicyParseError>,
    ) {
        assert_eq!(raw.parse::<ContractPolicy>(), expected);
    }
}
