//! Driven port reprojecting WGS84 points into EPSG:5186.

use async_trait::async_trait;

use crate::domain::{ProjectedPoint, Wgs84Point};

use super::define_port_error;

define_port_error! {
    /// Errors raised while reprojecting.
    pub enum ProjectionError {
        /// The projection backend could not be reached.
        Connection { message: String } =>
            "projection backend unavailable: {message}",
        /// The backend rejected or could not transform the point.
        Transform { message: String } =>
            "coordinate transform failed: {message}",
    }
}

/// Port for WGS84 to EPSG:5186 reprojection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CoordinateProjector: Send + Sync {
    /// Project a WGS84 point into the layer CRS.
    async fn project(&self, point: Wgs84Point) -> Result<ProjectedPoint, ProjectionError>;
}

/// Fixture projector returning a fixed central-Seoul EPSG:5186 point.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureCoordinateProjector;

#[async_trait]
impl CoordinateProjector for FixtureCoordinateProjector {
    async fn project(&self, _point: Wgs84Point) -> Result<ProjectedPoint, ProjectionError> {
        ProjectedPoint::new(198_056.0, 551_885.0)
            .map_err(|err| ProjectionError::transform(err.to_string()))
    }
}
