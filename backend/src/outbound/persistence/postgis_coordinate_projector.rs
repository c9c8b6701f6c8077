//! PostGIS-backed WGS84 to EPSG:5186 reprojection.

use async_trait::async_trait;
use diesel::QueryableByName;
use diesel::sql_query;
use diesel::sql_types::Double;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CoordinateProjector, ProjectionError};
use crate::domain::{ProjectedPoint, Wgs84Point};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::pool::DbPool;

const TRANSFORM_SQL: &str = "\
SELECT ST_X(p)::float8 AS x, ST_Y(p)::float8 AS y \
FROM (SELECT ST_Transform(ST_SetSRID(ST_MakePoint($1, $2), 4326), 5186) AS p) AS projected";

#[derive(Debug, QueryableByName)]
struct ProjectedRow {
    #[diesel(sql_type = Double)]
    x: f64,
    #[diesel(sql_type = Double)]
    y: f64,
}

/// Projector delegating `ST_Transform` to the GIS datastore.
#[derive(Clone)]
pub struct PostgisCoordinateProjector {
    pool: DbPool,
}

impl PostgisCoordinateProjector {
    /// Create a new projector with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CoordinateProjector for PostgisCoordinateProjector {
    async fn project(&self, point: Wgs84Point) -> Result<ProjectedPoint, ProjectionError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|error| map_basic_pool_error(error, ProjectionError::connection))?;
        let row: ProjectedRow = sql_query(TRANSFORM_SQL)
            .bind::<Double, _>(point.longitude())
            .bind::<Double, _>(point.latitude())
            .get_result(&mut conn)
            .await
            .map_err(|error| {
                map_basic_diesel_error(
                    error,
                    "ST_Transform",
                    ProjectionError::transform,
                    ProjectionError::connection,
                )
            })?;
        ProjectedPoint::new(row.x, row.y)
            .map_err(|error| ProjectionError::transform(error.to_string()))
    }
}
