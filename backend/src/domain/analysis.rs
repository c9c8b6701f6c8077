//! Persisted analysis records and history paging.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregates::SiteMetrics;
use super::business_type::BusinessTypeId;
use super::prediction::SurvivalPrediction;
use super::site::{ProjectedPoint, ServiceType, StoreArea, Wgs84Point};
use super::user::UserId;

/// Identifier shared by an analysis request and its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnalysisId(Uuid);

impl AnalysisId {
    /// Fresh random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a stored identifier.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AnalysisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AnalysisId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Geocoded site in both coordinate systems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteLocation {
    /// WGS84 coordinates.
    pub geographic: Wgs84Point,
    /// EPSG:5186 coordinates.
    pub projected: ProjectedPoint,
}

/// Optional natural-language commentary stored alongside a result.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    /// Overall summary.
    pub summary: Option<String>,
    /// Strengths of the site.
    pub strengths: Option<String>,
    /// Risks of the site.
    pub risks: Option<String>,
}

/// An analysis request together with its single result row.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    /// Shared request/result identifier.
    pub id: AnalysisId,
    /// Address as submitted.
    pub address: String,
    /// Store footprint.
    pub area: StoreArea,
    /// Business category.
    pub business_type_id: BusinessTypeId,
    /// Licence category.
    pub service_type: ServiceType,
    /// Geocoded coordinates.
    pub location: SiteLocation,
    /// Submitting user, if signed in.
    pub owner: Option<UserId>,
    /// Request creation time.
    pub created_at: DateTime<Utc>,
    /// Aggregated buffer metrics.
    pub metrics: SiteMetrics,
    /// Names of metrics whose query failed.
    pub unavailable_metrics: Vec<String>,
    /// Model output.
    pub prediction: SurvivalPrediction,
    /// Optional commentary.
    pub narrative: Narrative,
}

/// Compact history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    /// Shared request/result identifier.
    pub id: AnalysisId,
    /// Address as submitted.
    pub address: String,
    /// Business category.
    pub business_type_id: BusinessTypeId,
    /// Licence category.
    pub service_type: ServiceType,
    /// Rounded survival percentage.
    pub survival_percentage: f64,
    /// Request creation time.
    pub created_at: DateTime<Utc>,
}

/// Validation errors for [`HistoryPage`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryPageError {
    /// Limit outside `1..=MAX_LIMIT`.
    #[error("limit must be between 1 and {max}, got {value}")]
    LimitOutOfRange { value: i64, max: i64 },
    /// Offset below zero.
    #[error("offset must not be negative, got {value}")]
    NegativeOffset { value: i64 },
}

/// Bounded window over a user's analyses, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryPage {
    limit: i64,
    offset: i64,
}

impl HistoryPage {
    /// Default page size.
    pub const DEFAULT_LIMIT: i64 = 20;
    /// Largest accepted page size.
    pub const MAX_LIMIT: i64 = 100;

    /// Validate raw paging values; absent values use defaults.
    ///
    /// # Errors
    /// Returns [`HistoryPageError`] for out-of-range values.
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Result<Self, HistoryPageError> {
        let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);
        if !(1..=Self::MAX_LIMIT).contains(&limit) {
            return Err(HistoryPageError::LimitOutOfRange {
                value: limit,
                max: Self::MAX_LIMIT,
            });
        }
        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(HistoryPageError::NegativeOffset { value: offset });
        }
        Ok(Self { limit, offset })
    }

    /// Page size.
    #[must_use]
    pub fn limit(self) -> i64 {
        self.limit
    }

    /// Rows skipped.
    #[must_use]
    pub fn offset(self) -> i64 {
        self.offset
    }
}

impl Default for HistoryPage {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, Ok((20, 0)))]
    #[case(Some(5), Some(10), Ok((5, 10)))]
    #[case(Some(0), None, Err(()))]
    #[case(Some(101), None, Err(()))]
    #[case(None, Some(-1), Err(()))]
    fn history_page_bounds(
        #[case] limit: Option<i64>,
        #[case] offset: Option<i64>,
        #[case] expected: Result<(i64, i64), ()>,
    ) {
        let page = HistoryPage::new(limit, offset).map(|page| (page.limit(), page.offset()));
        assert_eq!(page.map_err(|_| ()), expected);
    }

    #[rstest]
    fn analysis_id_parses_uuid_text() {
        let id: AnalysisId = "3fa85f64-5717-4562-b3fc-2c963f66afa6"
            .parse()
            .expect("valid uuid");
        assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
        assert!("42".parse::<AnalysisId>().is_err());
    }
}
