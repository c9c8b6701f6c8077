//! Ordered model input vectors.
//!
//! The classifier was trained on a fixed column order. Two shapes exist: the
//! full contract ends with the business category id, the reduced contract
//! drops it. Reordering either list silently corrupts predictions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::aggregates::SiteMetrics;
use super::business_type::BusinessTypeId;
use super::site::{ServiceType, StoreArea};

/// Column names of the full contract, in model order.
pub static FULL_FEATURE_NAMES: [&str; 28] = [
    "area",
    "adjacent_biz_300m",
    "life_pop_300m",
    "total_land_value",
    "business_diversity_300m",
    "service_type",
    "life_pop_20_300m",
    "life_pop_30_300m",
    "life_pop_40_300m",
    "life_pop_50_300m",
    "life_pop_60_300m",
    "life_pop_20_1000m",
    "life_pop_30_1000m",
    "life_pop_40_1000m",
    "life_pop_50_1000m",
    "life_pop_60_1000m",
    "working_pop_300m",
    "temp_foreign_1000m",
    "temp_foreign_cn_300m",
    "temp_foreign_cn_1000m",
    "long_foreign_300m",
    "long_foreign_1000m",
    "long_foreign_cn_1000m",
    "school_250m",
    "public_building_250m",
    "competitor_300m",
    "competitor_ratio_300m",
    "business_type_id",
];

/// Input shape a prediction was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureContract {
    /// 28 columns including `business_type_id`.
    Full,
    /// 27 columns without `business_type_id`.
    Reduced,
}

impl FeatureContract {
    /// Number of columns.
    #[must_use]
    pub fn width(self) -> usize {
        self.feature_names().len()
    }

    /// Column names in model order.
    #[must_use]
    pub fn feature_names(self) -> &'static [&'static str] {
        match self {
            Self::Full => &FULL_FEATURE_NAMES,
            Self::Reduced => &FULL_FEATURE_NAMES[..FULL_FEATURE_NAMES.len() - 1],
        }
    }

    /// Stored label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Reduced => "reduced",
        }
    }
}

impl fmt::Display for FeatureContract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a stored contract label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feature contract: {0}")]
pub struct UnknownFeatureContract(pub String);

impl FromStr for FeatureContract {
    type Err = UnknownFeatureContract;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(Self::Full),
            "reduced" => Ok(Self::Reduced),
            other => Err(UnknownFeatureContract(other.to_owned())),
        }
    }
}

/// Values a feature vector is built from.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSource<'a> {
    /// Store footprint.
    pub area: StoreArea,
    /// Licence category.
    pub service_type: ServiceType,
    /// Business category.
    pub business_type_id: BusinessTypeId,
    /// Aggregated buffer metrics; unavailable metrics are already 0.
    pub metrics: &'a SiteMetrics,
}

impl FeatureSource<'_> {
    /// Build the vector for `contract` in model column order.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "counts and ids are small integers fed to a float model"
    )]
    pub fn vector(&self, contract: FeatureContract) -> Vec<f64> {
        let m = self.metrics;
        let mut values = vec![
            self.area.square_metres(),
            m.adjacent_biz_300m as f64,
            m.life_pop_300m,
            m.total_land_value,
            m.business_diversity_300m as f64,
            f64::from(self.service_type.wire_value()),
            m.life_pop_20_300m,
            m.life_pop_30_300m,
            m.life_pop_40_300m,
            m.life_pop_50_300m,
            m.life_pop_60_300m,
            m.life_pop_20_1000m,
            m.life_pop_30_1000m,
            m.life_pop_40_1000m,
            m.life_pop_50_1000m,
            m.life_pop_60_1000m,
            m.working_pop_300m,
            m.temp_foreign_1000m,
            m.temp_foreign_cn_300m,
            m.temp_foreign_cn_1000m,
            m.long_foreign_300m,
            m.long_foreign_1000m,
            m.long_foreign_cn_1000m,
            m.school_250m as f64,
            m.public_building_250m as f64,
            m.competitor_300m as f64,
            m.competitor_ratio_300m,
        ];
        if contract == FeatureContract::Full {
            values.push(f64::from(self.business_type_id.get()));
        }
        values
    }
}
