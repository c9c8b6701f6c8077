//! Driven port for buffer-intersection queries against the GIS datastore.
//!
//! Every query takes a [`LayerTable`] resolved at startup, a projected centre
//! and a radius in metres. Adapters return raw counts; ratios are derived in
//! the domain.

use async_trait::async_trait;

use crate::domain::{
    ForeignerCounts, LayerTable, PopulationCounts, ProjectedPoint, StoreCounts,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by spatial queries.
    pub enum SpatialQueryError {
        /// The datastore reported lock contention; retrying may succeed.
        Locked { message: String } =>
            "spatial datastore is locked: {message}",
        /// A single query failed (missing column, bad geometry, timeout).
        Query { message: String } =>
            "spatial query failed: {message}",
        /// No connection could be obtained.
        Connection { message: String } =>
            "spatial datastore connection failed: {message}",
    }
}

impl SpatialQueryError {
    /// Whether the failure is transient lock contention.
    #[must_use]
    pub fn is_lock_contention(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }
}

/// Port for the read-only GIS layers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpatialDataSource: Send + Sync {
    /// Whether a table with this name exists.
    async fn table_exists(&self, table: &str) -> Result<bool, SpatialQueryError>;

    /// Resident population totals by age decade within `radius_m`.
    async fn resident_population(
        &self,
        table: LayerTable,
        centre: ProjectedPoint,
        radius_m: f64,
    ) -> Result<PopulationCounts, SpatialQueryError>;

    /// Workplace population total within `radius_m`.
    async fn working_population(
        &self,
        table: LayerTable,
        centre: ProjectedPoint,
        radius_m: f64,
    ) -> Result<f64, SpatialQueryError>;

    /// Foreign-resident total and Chinese nationals within `radius_m`.
    async fn foreign_residents(
        &self,
        table: LayerTable,
        centre: ProjectedPoint,
        radius_m: f64,
    ) -> Result<ForeignerCounts, SpatialQueryError>;

    /// Number of features intersecting the buffer.
    async fn count_features(
        &self,
        table: LayerTable,
        centre: ProjectedPoint,
        radius_m: f64,
    ) -> Result<i64, SpatialQueryError>;

    /// Store counts within `radius_m`; competitors match `category` exactly.
    async fn store_counts(
        &self,
        table: LayerTable,
        centre: ProjectedPoint,
        radius_m: f64,
        category: &str,
    ) -> Result<StoreCounts, SpatialQueryError>;

    /// Unit land price (won per ㎡) of the nearest parcel, if any.
    async fn nearest_land_price(
        &self,
        table: LayerTable,
        centre: ProjectedPoint,
    ) -> Result<Option<f64>, SpatialQueryError>;
}

/// Fixture datastore where every layer exists and every buffer is empty.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSpatialDataSource;

#[async_trait]
impl SpatialDataSource for FixtureSpatialDataSource {
    async fn table_exists(&self, _table: &str) -> Result<bool, SpatialQueryError> {
        Ok(true)
    }

    async fn resident_population(
        &self,
        _table: LayerTable,
        _centre: ProjectedPoint,
        _radius_m: f64,
    ) -> Result<PopulationCounts, SpatialQueryError> {
        Ok(PopulationCounts::default())
    }

    async fn working_population(
        &self,
        _table: LayerTable,
        _centre: ProjectedPoint,
        _radius_m: f64,
    ) -> Result<f64, SpatialQueryError> {
        Ok(0.0)
    }

    async fn foreign_residents(
        &self,
        _table: LayerTable,
        _centre: ProjectedPoint,
        _radius_m: f64,
    ) -> Result<ForeignerCounts, SpatialQueryError> {
        Ok(ForeignerCounts::default())
    }

    async fn count_features(
        &self,
        _table: LayerTable,
        _centre: ProjectedPoint,
        _radius_m: f64,
    ) -> Result<i64, SpatialQueryError> {
        Ok(0)
    }

    async fn store_counts(
        &self,
        _table: LayerTable,
        _centre: ProjectedPoint,
        _radius_m: f64,
        _category: &str,
    ) -> Result<StoreCounts, SpatialQueryError> {
        Ok(StoreCounts::default())
    }

    async fn nearest_land_price(
        &self,
        _table: LayerTable,
        _centre: ProjectedPoint,
    ) -> Result<Option<f64>, SpatialQueryError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SpatialQueryError::locked("deadlock detected"), true)]
    #[case(SpatialQueryError::query("column missing"), false)]
    #[case(SpatialQueryError::connection("refused"), false)]
    fn only_lock_errors_are_contention(#[case] err: SpatialQueryError, #[case] expected: bool) {
        assert_eq!(err.is_lock_contention(), expected);
    }
}
